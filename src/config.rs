//! nft-flow configuration.
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! `NFT_FLOW_*` environment variables, then command-line flags.

use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{cli::Cli, error::Error};

pub const DEFAULT_CONFIG_FILE: &str = "nft-flow";
const ENV_PREFIX: &str = "NFT_FLOW";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// JSON RPC URL or cluster moniker.
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "defaults::fee_payer_mnemonic")]
    pub fee_payer_mnemonic: String,

    #[serde(default)]
    pub fee_payer_passphrase: String,

    /// Path to a JSON keypair file. Takes precedence over the seed phrase.
    #[serde(default)]
    pub fee_payer_keypair: Option<String>,

    #[serde(default = "defaults::user_mnemonic")]
    pub user_mnemonic: String,

    #[serde(default)]
    pub user_passphrase: String,

    #[serde(default)]
    pub user_keypair: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            poll_interval_ms: defaults::poll_interval_ms(),
            fee_payer_mnemonic: defaults::fee_payer_mnemonic(),
            fee_payer_passphrase: String::new(),
            fee_payer_keypair: None,
            user_mnemonic: defaults::user_mnemonic(),
            user_passphrase: String::new(),
            user_keypair: None,
        }
    }
}

impl Config {
    /// Load the file and environment layers.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self, Error> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Command-line flags take precedence over every other layer.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), Error> {
        if let Some(url) = &cli.url {
            self.rpc_url = url.clone();
        }
        if let Some(poll_interval_ms) = cli.poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), Error> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// The RPC endpoint with any moniker expanded.
    pub fn json_rpc_url(&self) -> Result<String, Error> {
        normalize_to_url_if_moniker(&self.rpc_url)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Expands `mainnet-beta`, `testnet`, `devnet`, `localhost` (or their first
/// letter) to a JSON RPC URL. Anything else must already look like a URL.
pub fn normalize_to_url_if_moniker(url_or_moniker: &str) -> Result<String, Error> {
    let url = match url_or_moniker {
        "m" | "mainnet-beta" => "https://api.mainnet-beta.solana.com",
        "t" | "testnet" => "https://api.testnet.solana.com",
        "d" | "devnet" => "https://api.devnet.solana.com",
        "l" | "localhost" => "http://localhost:8899",
        url if url.starts_with("http://") || url.starts_with("https://") => url,
        other => {
            return Err(Error::Config(format!(
                "`{other}` is neither a URL nor a cluster moniker"
            )))
        }
    };
    Ok(url.to_string())
}

mod defaults {
    pub fn rpc_url() -> String {
        "devnet".into()
    }

    pub fn poll_interval_ms() -> u64 {
        crate::confirm::DEFAULT_POLL_INTERVAL.as_millis() as u64
    }

    // Well-known devnet demo wallets. Override them for anything real.
    pub fn fee_payer_mnemonic() -> String {
        "near industry doctor stool celery vehicle enlist symbol skate plastic ceiling zero".into()
    }

    pub fn user_mnemonic() -> String {
        "manual still spice defense merry danger bus venture rare peace matrix federal".into()
    }
}
