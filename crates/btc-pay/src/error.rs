use btc_core::BtcError;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum PayError {
    #[error("Bitcoin: {0}")]
    Btc(#[from] BtcError),

    #[error("Provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Not enough funds to send {needed} satoshi, only {available} left")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("The fee {fee} covers the entire amount {amount}")]
    FeeExceedsAmount { fee: u64, amount: u64 },

    #[error("No source key can sign for {0}")]
    UnmatchedKey(String),
}
