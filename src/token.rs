use anyhow::Context;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction, program_pack::Pack, pubkey::Pubkey,
    system_instruction::create_account,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::{create_associated_token_account, create_associated_token_account_idempotent},
};
use spl_token_2022::{
    extension::StateWithExtensions,
    instruction::{initialize_mint2, mint_to, transfer_checked},
    state::{Account, Mint},
};

/// NFTs are minted under the original SPL Token program.
pub const TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

pub const NFT_DECIMALS: u8 = 0;
pub const NFT_AMOUNT: u64 = 1;

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, token_program)
}

pub fn unpack_token_account(data: &[u8]) -> anyhow::Result<Account> {
    Ok(StateWithExtensions::<Account>::unpack(data)?.base)
}

pub fn unpack_mint(data: &[u8]) -> anyhow::Result<Mint> {
    Ok(StateWithExtensions::<Mint>::unpack(data)?.base)
}

/// Reads a token account and returns it with the token program that owns it.
pub async fn get_token_account(
    client: &RpcClient,
    address: &Pubkey,
) -> anyhow::Result<(Account, Pubkey)> {
    let account = client
        .get_account(address)
        .await
        .with_context(|| format!("failed to get account info for {address}"))?;
    let token_account = unpack_token_account(&account.data)
        .with_context(|| format!("failed to parse {address} as a token account"))?;
    Ok((token_account, account.owner))
}

pub async fn get_mint(client: &RpcClient, mint_address: &Pubkey) -> anyhow::Result<Mint> {
    let mint_data = client
        .get_account_data(mint_address)
        .await
        .with_context(|| format!("failed to get account info for mint {mint_address}"))?;
    unpack_mint(&mint_data).with_context(|| format!("failed to parse {mint_address} as a mint"))
}

/// Allocates and initialises a zero-decimal mint. `authority` holds both the
/// mint and freeze authority.
pub fn create_mint_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    mint_account_rent: u64,
) -> anyhow::Result<[Instruction; 2]> {
    let create_mint_account_ix = create_account(
        payer,
        mint,
        mint_account_rent,
        Mint::LEN as u64,
        &TOKEN_PROGRAM_ID,
    );
    let initialize_mint_ix = initialize_mint2(
        &TOKEN_PROGRAM_ID,
        mint,
        authority,
        Some(authority),
        NFT_DECIMALS,
    )?;
    Ok([create_mint_account_ix, initialize_mint_ix])
}

/// Creates `owner`'s ATA for `mint` and mints the single token into it.
pub fn mint_one_instructions(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
) -> anyhow::Result<[Instruction; 2]> {
    let ata = associated_token_address(owner, mint, &TOKEN_PROGRAM_ID);
    let create_ata_ix = create_associated_token_account(payer, owner, mint, &TOKEN_PROGRAM_ID);
    let mint_to_ix = mint_to(&TOKEN_PROGRAM_ID, mint, &ata, authority, &[], NFT_AMOUNT)?;
    Ok([create_ata_ix, mint_to_ix])
}

/// Moves the single token from `sender`'s ATA to `receiver`'s, creating the
/// receiver's ATA when it does not exist yet.
pub fn transfer_one_instructions(
    payer: &Pubkey,
    sender: &Pubkey,
    receiver: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> anyhow::Result<[Instruction; 2]> {
    let sender_ata = associated_token_address(sender, mint, token_program);
    let receiver_ata = associated_token_address(receiver, mint, token_program);

    let create_ata_ix =
        create_associated_token_account_idempotent(payer, receiver, mint, token_program);
    let transfer_ix = transfer_checked(
        token_program,
        &sender_ata,
        mint,
        &receiver_ata,
        sender,
        &[],
        NFT_AMOUNT,
        NFT_DECIMALS,
    )?;
    Ok([create_ata_ix, transfer_ix])
}
