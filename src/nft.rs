//! Minting, transferring and inspecting a single NFT.

use anyhow::Context;
use mpl_token_metadata::accounts::Metadata;
use solana_client::{
    nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig,
};
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_token_2022::state::{Account, Mint};
use tracing::info;

use crate::{
    token::{self, TOKEN_PROGRAM_ID},
    token_metadata::{self, trim_padding, NftMetadata},
};

#[derive(Clone, Debug)]
pub struct NftMintReq {
    pub receiver: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub collection: Pubkey,
}

pub struct NftTransferReq<'a> {
    pub token_address: Pubkey,
    pub sender: &'a Keypair,
    pub receiver: Pubkey,
}

/// A submitted, not yet confirmed, NFT transaction.
#[derive(Clone, Copy, Debug)]
pub struct NftTx {
    pub signature: Signature,
    pub mint: Pubkey,
    /// The token account now (or soon) holding the NFT.
    pub token_account: Pubkey,
}

pub struct NftInfo {
    pub address: Pubkey,
    pub token_account: Account,
    pub mint: Mint,
    pub metadata: Metadata,
}

/// Instructions minting one NFT under `mint` to `req.receiver`, in the order
/// the programs require: mint account, mint init, metadata, receiver ATA,
/// the single token, then the master edition freezing the supply.
pub fn mint_instructions(
    fee_payer: &Pubkey,
    mint: &Pubkey,
    mint_account_rent: u64,
    req: &NftMintReq,
) -> anyhow::Result<Vec<Instruction>> {
    let mut instructions = Vec::with_capacity(6);
    instructions.extend(token::create_mint_instructions(
        fee_payer,
        mint,
        fee_payer,
        mint_account_rent,
    )?);
    instructions.push(token_metadata::create_metadata_instruction(
        mint,
        fee_payer,
        NftMetadata {
            name: req.name.clone(),
            symbol: req.symbol.clone(),
            uri: req.uri.clone(),
            collection: req.collection,
        },
    ));
    instructions.extend(token::mint_one_instructions(
        fee_payer,
        &req.receiver,
        mint,
        fee_payer,
    )?);
    instructions.push(token_metadata::create_master_edition_instruction(
        mint, fee_payer,
    ));
    Ok(instructions)
}

pub async fn mint_nft(
    client: &RpcClient,
    fee_payer: &Keypair,
    req: &NftMintReq,
) -> anyhow::Result<NftTx> {
    let mint_account = Keypair::new();
    let mint = mint_account.pubkey();
    let token_account = token::associated_token_address(&req.receiver, &mint, &TOKEN_PROGRAM_ID);
    info!(%mint, receiver = %req.receiver, name = %req.name, "minting nft");

    let mint_account_rent = client
        .get_minimum_balance_for_rent_exemption(Mint::LEN)
        .await
        .context("failed to get mint account rent")?;

    let instructions = mint_instructions(&fee_payer.pubkey(), &mint, mint_account_rent, req)
        .context("failed to build mint instructions")?;

    let recent_blockhash = latest_blockhash(client).await?;
    let transaction = Transaction::new_signed_with_payer(
        &instructions,
        Some(&fee_payer.pubkey()),
        &[&mint_account, fee_payer],
        recent_blockhash,
    );
    let signature = send(client, &transaction).await?;

    Ok(NftTx {
        signature,
        mint,
        token_account,
    })
}

pub async fn transfer_nft(
    client: &RpcClient,
    fee_payer: &Keypair,
    req: &NftTransferReq<'_>,
) -> anyhow::Result<NftTx> {
    let (token_account, token_program) = token::get_token_account(client, &req.token_address).await?;
    let mint = token_account.mint;
    let receiver_ata = token::associated_token_address(&req.receiver, &mint, &token_program);
    info!(
        %mint,
        sender = %req.sender.pubkey(),
        receiver = %req.receiver,
        "transferring nft"
    );

    let instructions = token::transfer_one_instructions(
        &fee_payer.pubkey(),
        &req.sender.pubkey(),
        &req.receiver,
        &mint,
        &token_program,
    )
    .context("failed to build transfer instructions")?;

    let recent_blockhash = latest_blockhash(client).await?;
    let transaction = Transaction::new_signed_with_payer(
        &instructions,
        Some(&fee_payer.pubkey()),
        &[fee_payer, req.sender],
        recent_blockhash,
    );
    let signature = send(client, &transaction).await?;

    Ok(NftTx {
        signature,
        mint,
        token_account: receiver_ata,
    })
}

pub async fn get_nft_info(client: &RpcClient, address: &Pubkey) -> anyhow::Result<NftInfo> {
    let (token_account, _) = token::get_token_account(client, address).await?;
    let mint = token::get_mint(client, &token_account.mint).await?;
    let metadata = token_metadata::get_metadata(client, &token_account.mint).await?;
    Ok(NftInfo {
        address: *address,
        token_account,
        mint,
        metadata,
    })
}

pub fn print_nft_info(info: &NftInfo) {
    println!("token info for: {} ----------------------------------", info.address);
    println!("token account:\n{:#?}\n", info.token_account);
    println!("mint account:\n{:#?}\n", info.mint);
    println!("metadata account:\n{:#?}\n", info.metadata);
    println!(
        "name: {:?}, symbol: {:?}, uri: {:?}",
        trim_padding(&info.metadata.name),
        trim_padding(&info.metadata.symbol),
        trim_padding(&info.metadata.uri),
    );
    println!("---------------------------------------------------------------------");
}

async fn latest_blockhash(client: &RpcClient) -> anyhow::Result<Hash> {
    let (blockhash, _) = client
        .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
        .await
        .context("failed to get recent blockhash")?;
    Ok(blockhash)
}

async fn send(client: &RpcClient, transaction: &Transaction) -> anyhow::Result<Signature> {
    let signature = client
        .send_transaction_with_config(
            transaction,
            RpcSendTransactionConfig {
                preflight_commitment: Some(CommitmentLevel::Confirmed),
                ..RpcSendTransactionConfig::default()
            },
        )
        .await
        .context("failed to send tx")?;
    info!(%signature, "transaction sent");
    Ok(signature)
}
