//! Error types detected by nft-flow itself.
//!
//! Failures coming out of the SDK crates travel as `anyhow::Error` with
//! context attached at the call site.

use std::fmt;

use solana_sdk::{signature::Signature, transaction::TransactionError};

#[derive(Debug)]
pub enum Error {
    /// Configuration could not be turned into something usable.
    Config(String),
    /// A seed phrase or keypair file did not yield a keypair.
    Wallet(String),
    /// The transaction was confirmed but failed while executing.
    TransactionFailed {
        signature: Signature,
        err: TransactionError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Wallet(msg) => write!(f, "wallet error: {msg}"),
            Error::TransactionFailed { signature, err } => {
                write!(f, "transaction {signature} failed: {err}")
            }
        }
    }
}

impl std::error::Error for Error {}
