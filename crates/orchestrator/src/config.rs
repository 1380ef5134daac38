//! Process configuration.
//!
//! All required values are read and validated once at startup; a missing
//! variable prevents startup entirely rather than failing on first use.

use anyhow::{anyhow, Result};
use rwa_ipfs::PinataConfig;
use rwa_ledger::LedgerConfig;

const DEFAULT_CONFIRM_INTERVAL_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub pinata: PinataConfig,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup, so tests can supply
    /// values without mutating the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("missing required environment variable: {}", key))
        };

        let confirm_interval_secs = match lookup("CONFIRM_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow!("CONFIRM_INTERVAL_SECS must be an integer: {:?}", raw))?,
            None => DEFAULT_CONFIRM_INTERVAL_SECS,
        };

        let ledger = LedgerConfig {
            rpc_url: require("RPC_URL")?,
            asset_token_address: require("ASSET_TOKEN_ADDRESS")?,
            marketplace_address: require("MARKETPLACE_ADDRESS")?,
            confirm_interval_secs,
        };
        ledger
            .validate()
            .map_err(|e| anyhow!("invalid ledger configuration: {}", e))?;

        let pinata = PinataConfig::new(
            require("PINATA_API_KEY")?,
            require("PINATA_SECRET_API_KEY")?,
        );
        pinata
            .validate()
            .map_err(|e| anyhow!("invalid content store configuration: {}", e))?;

        Ok(Self { ledger, pinata })
    }
}
