//! Wallet configuration loaded from TOML.

use std::fs;
use std::path::Path;

use btc_core::BtcNetwork;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 21 million BTC in satoshi.
pub const MAX_MONEY: u64 = 21_000_000 * 100_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletConfig {
    pub network: BtcNetwork,
    /// Derive P2PKH addresses instead of P2WPKH.
    pub base58: bool,
    /// Floor for the fee actually paid, in satoshi.
    pub min_fee: u64,
    /// Never broadcast; the provider's `push` becomes a no-op.
    pub dry_run: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: BtcNetwork::Mainnet,
            base58: false,
            min_fee: 0,
            dry_run: false,
        }
    }
}

impl WalletConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WalletConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_fee > MAX_MONEY {
            return Err(ConfigError::Invalid(format!(
                "min_fee {} exceeds the total money supply",
                self.min_fee
            )));
        }
        Ok(())
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WalletConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    WalletConfig::from_toml_str(&content)
}
