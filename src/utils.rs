use anyhow::{Context, Result};
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::keypair::keypair_from_seed_phrase_and_passphrase,
};
use tracing::info;

use crate::{confirm::wait_for_confirmation, error::Error};

/// BIP-39 seed of `phrase`, first 32 bytes used as the ed25519 secret.
pub fn keypair_from_mnemonic(phrase: &str, passphrase: &str) -> Result<Keypair, Error> {
    keypair_from_seed_phrase_and_passphrase(phrase, passphrase)
        .map_err(|e| Error::Wallet(format!("invalid seed phrase: {e}")))
}

pub fn load_wallet(keypair_path: Option<&str>, phrase: &str, passphrase: &str) -> Result<Keypair> {
    match keypair_path {
        Some(path) => read_keypair_file(path)
            .map_err(|e| Error::Wallet(format!("failed to read keypair file {path}: {e}")).into()),
        None => Ok(keypair_from_mnemonic(phrase, passphrase)?),
    }
}

pub async fn balance(client: &RpcClient, account: &Pubkey) -> Result<u64> {
    client
        .get_balance(account)
        .await
        .with_context(|| format!("failed to get balance of {account}"))
}

pub async fn airdrop(
    client: &RpcClient,
    account: &Pubkey,
    sol: u64,
    poll_interval: Duration,
) -> Result<()> {
    let lamports = sol
        .checked_mul(LAMPORTS_PER_SOL)
        .with_context(|| format!("airdrop of {sol} SOL overflows the lamport amount"))?;
    info!(%account, sol, "airdropping...");
    let transaction_signature = client
        .request_airdrop(account, lamports)
        .await
        .context("failed to request airdrop")?;
    if let Some(err) = wait_for_confirmation(client, &transaction_signature, poll_interval).await {
        return Err(Error::TransactionFailed {
            signature: transaction_signature,
            err,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signer::Signer;

    const PHRASE: &str =
        "near industry doctor stool celery vehicle enlist symbol skate plastic ceiling zero";

    #[test]
    fn same_phrase_gives_same_wallet() {
        let a = keypair_from_mnemonic(PHRASE, "").unwrap();
        let b = keypair_from_mnemonic(PHRASE, "").unwrap();
        assert_eq!(a.pubkey(), b.pubkey());
    }

    #[test]
    fn passphrase_changes_the_wallet() {
        let plain = keypair_from_mnemonic(PHRASE, "").unwrap();
        let salted = keypair_from_mnemonic(PHRASE, "hunter2").unwrap();
        assert_ne!(plain.pubkey(), salted.pubkey());
    }

    #[test]
    fn missing_keypair_file_is_a_wallet_error() {
        let err = load_wallet(Some("/nonexistent/id.json"), PHRASE, "").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Wallet(_))));
    }

    #[tokio::test]
    async fn oversized_airdrop_fails_before_any_request() {
        let client = RpcClient::new_mock("succeeds".to_string());

        let err = airdrop(
            &client,
            &Pubkey::new_unique(),
            u64::MAX / LAMPORTS_PER_SOL + 1,
            Duration::from_millis(1),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("overflows"));
    }
}
