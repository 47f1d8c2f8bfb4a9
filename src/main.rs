use std::{process, sync::Arc};

use anyhow::Context;
use clap::Parser;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod confirm;
mod error;
mod nft;
mod token;
mod token_metadata;
mod utils;

use crate::{
    cli::{Cli, Command},
    config::Config,
    confirm::wait_for_confirmation,
    error::Error,
    nft::{NftMintReq, NftTransferReq},
};

struct App {
    client: Arc<RpcClient>,
    config: Config,
}

impl App {
    fn fee_payer(&self) -> anyhow::Result<Keypair> {
        utils::load_wallet(
            self.config.fee_payer_keypair.as_deref(),
            &self.config.fee_payer_mnemonic,
            &self.config.fee_payer_passphrase,
        )
        .context("failed to load fee payer account")
    }

    fn user(&self) -> anyhow::Result<Keypair> {
        utils::load_wallet(
            self.config.user_keypair.as_deref(),
            &self.config.user_mnemonic,
            &self.config.user_passphrase,
        )
        .context("failed to load user account")
    }

    /// Waits for `signature` and turns an on-chain failure into an error.
    async fn confirm(&self, signature: &Signature) -> anyhow::Result<()> {
        match wait_for_confirmation(self.client.as_ref(), signature, self.config.poll_interval())
            .await
        {
            None => Ok(()),
            Some(err) => Err(Error::TransactionFailed {
                signature: *signature,
                err,
            }
            .into()),
        }
    }

    async fn show_balance(&self, label: &str, account: &Pubkey) -> anyhow::Result<()> {
        let lamports = utils::balance(&self.client, account).await?;
        println!(
            "{label} balance: {lamports} lamports ({} SOL)\n",
            lamports as f64 / LAMPORTS_PER_SOL as f64
        );
        Ok(())
    }

    async fn mint(&self, fee_payer: &Keypair, req: &NftMintReq) -> anyhow::Result<Pubkey> {
        let minted = nft::mint_nft(&self.client, fee_payer, req)
            .await
            .context("failed to mint nft")?;
        println!("NFT: {}\n", minted.mint);
        self.confirm(&minted.signature).await?;
        Ok(minted.token_account)
    }

    async fn transfer(&self, fee_payer: &Keypair, req: &NftTransferReq<'_>) -> anyhow::Result<Pubkey> {
        let transferred = nft::transfer_nft(&self.client, fee_payer, req)
            .await
            .context("failed to transfer nft")?;
        self.confirm(&transferred.signature).await?;
        Ok(transferred.token_account)
    }

    async fn info(&self, token_account: &Pubkey) -> anyhow::Result<()> {
        let info = nft::get_nft_info(&self.client, token_account).await?;
        nft::print_nft_info(&info);
        Ok(())
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config_file.as_deref())?;
    config.apply_cli(&cli)?;

    let json_rpc_url = config.json_rpc_url()?;
    info!(rpc = %json_rpc_url, poll_interval_ms = config.poll_interval_ms, "configuration loaded");

    let app = App {
        client: Arc::new(RpcClient::new_with_commitment(
            json_rpc_url,
            CommitmentConfig::confirmed(),
        )),
        config,
    };

    match cli.command {
        Command::Demo { name, uri } => {
            let fee_payer = app.fee_payer()?;
            println!("feePayer: {}\n", fee_payer.pubkey());
            let user = app.user()?;
            println!("user: {}\n", user.pubkey());

            app.show_balance("feePayer", &fee_payer.pubkey()).await?;
            app.show_balance("user", &user.pubkey()).await?;

            let collection = Keypair::new().pubkey();
            println!("collection: {collection}\n");
            let receiver = Keypair::new().pubkey();
            println!("receiver: {receiver}\n");

            let token_account = app
                .mint(
                    &fee_payer,
                    &NftMintReq {
                        receiver: user.pubkey(),
                        name,
                        symbol: String::new(),
                        uri,
                        collection,
                    },
                )
                .await?;
            app.info(&token_account).await?;

            let token_account = app
                .transfer(
                    &fee_payer,
                    &NftTransferReq {
                        token_address: token_account,
                        sender: &user,
                        receiver,
                    },
                )
                .await?;
            app.info(&token_account).await?;
        }
        Command::Mint {
            name,
            uri,
            symbol,
            receiver,
            collection,
        } => {
            let fee_payer = app.fee_payer()?;
            let receiver = match receiver {
                Some(receiver) => receiver,
                None => app.user()?.pubkey(),
            };
            let collection = collection.unwrap_or_else(|| Keypair::new().pubkey());
            println!("collection: {collection}\n");

            let token_account = app
                .mint(
                    &fee_payer,
                    &NftMintReq {
                        receiver,
                        name,
                        symbol,
                        uri,
                        collection,
                    },
                )
                .await?;
            app.info(&token_account).await?;
        }
        Command::Transfer {
            token_account,
            receiver,
        } => {
            let fee_payer = app.fee_payer()?;
            let sender = app.user()?;
            let token_account = app
                .transfer(
                    &fee_payer,
                    &NftTransferReq {
                        token_address: token_account,
                        sender: &sender,
                        receiver,
                    },
                )
                .await?;
            app.info(&token_account).await?;
        }
        Command::Info { token_account } => app.info(&token_account).await?,
        Command::Balance => {
            let fee_payer = app.fee_payer()?.pubkey();
            println!("feePayer: {fee_payer}");
            app.show_balance("feePayer", &fee_payer).await?;
            let user = app.user()?.pubkey();
            println!("user: {user}");
            app.show_balance("user", &user).await?;
        }
        Command::Airdrop { sol, to } => {
            let to = match to {
                Some(to) => to,
                None => app.fee_payer()?.pubkey(),
            };
            utils::airdrop(&app.client, &to, sol, app.config.poll_interval()).await?;
            app.show_balance(&to.to_string(), &to).await?;
        }
        Command::Wait { signature } => app.confirm(&signature).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{err:#}");
        process::exit(1);
    }
}
