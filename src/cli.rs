use std::path::PathBuf;

use clap::{Parser, Subcommand};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

#[derive(Parser, Debug)]
#[command(
    name = "nft-flow",
    version,
    about = "Mint, transfer and inspect Metaplex NFTs",
    long_about = "Mint, transfer and inspect Metaplex NFTs on a Solana cluster.\nResults are printed to stdout; logs go to stderr (RUST_LOG)."
)]
pub struct Cli {
    /// Config file (TOML). Defaults to ./nft-flow.toml when present
    #[arg(short = 'C', long = "config", global = true, value_name = "FILEPATH")]
    pub config_file: Option<PathBuf>,

    /// JSON RPC URL or moniker: [mainnet-beta, testnet, devnet, localhost] or their first letter
    #[arg(short = 'u', long = "url", global = true, value_name = "URL_OR_MONIKER")]
    pub url: Option<String>,

    /// Interval between confirmation status queries
    #[arg(long, global = true, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mint an NFT to the user wallet, inspect it, transfer it to a fresh key, inspect again
    Demo {
        #[arg(long, default_value = "game nft 1")]
        name: String,

        #[arg(long, default_value = "ipfs://123")]
        uri: String,
    },

    /// Mint a new NFT
    Mint {
        #[arg(long)]
        name: String,

        /// Metadata JSON URI
        #[arg(long)]
        uri: String,

        #[arg(long, default_value = "")]
        symbol: String,

        /// Owner of the new NFT. Defaults to the user wallet
        #[arg(long)]
        receiver: Option<Pubkey>,

        /// Collection to reference (unverified). Defaults to a freshly generated key
        #[arg(long)]
        collection: Option<Pubkey>,
    },

    /// Transfer an NFT held by the user wallet
    Transfer {
        /// Token account currently holding the NFT
        #[arg(long)]
        token_account: Pubkey,

        /// New owner wallet
        #[arg(long)]
        receiver: Pubkey,
    },

    /// Show the token account, mint and metadata behind a token account
    #[command(alias = "inspect")]
    Info { token_account: Pubkey },

    /// Show fee payer and user wallet balances
    Balance,

    /// Request an airdrop (devnet, testnet and local validators only)
    Airdrop {
        #[arg(long, default_value_t = 1)]
        sol: u64,

        /// Recipient. Defaults to the fee payer
        #[arg(long)]
        to: Option<Pubkey>,
    },

    /// Wait until a transaction reaches the confirmed commitment level
    Wait { signature: Signature },
}
