//! Configuration for the ledger gateway

use crate::types::is_valid_address;
use serde::{Deserialize, Serialize};

/// Configuration for a ledger gateway connection.
///
/// Built once at process startup and handed to `HttpLedger::new` as an
/// immutable handle; construction fails fast on invalid values rather than
/// surfacing them on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// RPC gateway URL, e.g. "https://rpc.example.org"
    pub rpc_url: String,

    /// Deployed AssetToken contract address (0x-prefixed, 42 characters)
    pub asset_token_address: String,

    /// Deployed Marketplace contract address (0x-prefixed, 42 characters)
    pub marketplace_address: String,

    /// How often to poll for transaction confirmation, in seconds.
    /// There is deliberately no overall confirmation timeout: inclusion
    /// latency is unbounded and abandonment is not rollback.
    pub confirm_interval_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            asset_token_address: String::new(),
            marketplace_address: String::new(),
            confirm_interval_secs: 2,
        }
    }
}

impl LedgerConfig {
    /// Validate configuration, returning a message describing the first
    /// problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.rpc_url.is_empty() {
            return Err("rpc_url cannot be empty".to_string());
        }
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err("rpc_url must start with http:// or https://".to_string());
        }
        if !is_valid_address(&self.asset_token_address) {
            return Err(format!(
                "asset_token_address is not a valid address: {:?}",
                self.asset_token_address
            ));
        }
        if !is_valid_address(&self.marketplace_address) {
            return Err(format!(
                "marketplace_address is not a valid address: {:?}",
                self.marketplace_address
            ));
        }
        if self.confirm_interval_secs == 0 {
            return Err("confirm_interval_secs must be > 0".to_string());
        }
        if self.confirm_interval_secs > 3600 {
            return Err("confirm_interval_secs too large (max 1 hour)".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> LedgerConfig {
        LedgerConfig {
            rpc_url: "https://rpc.example.org".to_string(),
            asset_token_address: "0x1234567890123456789012345678901234567890".to_string(),
            marketplace_address: "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".to_string(),
            confirm_interval_secs: 2,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_rpc_url() {
        let mut config = valid_config();
        config.rpc_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rpc_scheme() {
        let mut config = valid_config();
        config.rpc_url = "ws://localhost:8545".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_contract_addresses() {
        let mut config = valid_config();
        config.asset_token_address = "0x123".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.marketplace_address = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_confirm_interval_bounds() {
        let mut config = valid_config();
        config.confirm_interval_secs = 0;
        assert!(config.validate().is_err());

        config.confirm_interval_secs = 7200;
        assert!(config.validate().is_err());

        config.confirm_interval_secs = 5;
        assert!(config.validate().is_ok());
    }
}
