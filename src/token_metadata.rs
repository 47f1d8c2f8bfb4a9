use anyhow::Context;
use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    instructions::{CreateMasterEditionV3Builder, CreateMetadataAccountV3Builder},
    types::{Collection, DataV2},
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::token::TOKEN_PROGRAM_ID;

/// On-chain fields of a new NFT's metadata account.
#[derive(Clone, Debug)]
pub struct NftMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    /// Referenced unverified; verifying is up to the collection authority.
    pub collection: Pubkey,
}

pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Metadata::find_pda(mint).0
}

pub fn master_edition_address(mint: &Pubkey) -> Pubkey {
    MasterEdition::find_pda(mint).0
}

/// Immutable metadata with no royalties, creators or uses. `authority` is
/// the mint authority, update authority and payer.
pub fn create_metadata_instruction(
    mint: &Pubkey,
    authority: &Pubkey,
    metadata: NftMetadata,
) -> Instruction {
    CreateMetadataAccountV3Builder::new()
        .metadata(metadata_address(mint))
        .mint(*mint)
        .mint_authority(*authority)
        .payer(*authority)
        .update_authority(*authority, true)
        .data(DataV2 {
            name: metadata.name,
            symbol: metadata.symbol,
            uri: metadata.uri,
            seller_fee_basis_points: 0,
            creators: None,
            collection: Some(Collection {
                verified: false,
                key: metadata.collection,
            }),
            uses: None,
        })
        .is_mutable(false)
        .instruction()
}

/// Fixes the supply at the one token already minted.
pub fn create_master_edition_instruction(mint: &Pubkey, authority: &Pubkey) -> Instruction {
    CreateMasterEditionV3Builder::new()
        .edition(master_edition_address(mint))
        .mint(*mint)
        .update_authority(*authority)
        .mint_authority(*authority)
        .payer(*authority)
        .metadata(metadata_address(mint))
        .token_program(TOKEN_PROGRAM_ID)
        .max_supply(0)
        .instruction()
}

pub async fn get_metadata(client: &RpcClient, mint: &Pubkey) -> anyhow::Result<Metadata> {
    let metadata_account = metadata_address(mint);
    let data = client
        .get_account_data(&metadata_account)
        .await
        .with_context(|| format!("failed to get metadata account {metadata_account}"))?;
    Metadata::from_bytes(&data)
        .with_context(|| format!("failed to parse metadata account {metadata_account}"))
}

/// Metadata strings are stored padded with NULs to a fixed width.
pub fn trim_padding(s: &str) -> &str {
    s.trim_end_matches('\0')
}
