//! The data-provider capability consumed by the payment orchestrator.

use std::sync::Arc;

use btc_core::Script;
use thiserror::Error;

use crate::fee::FeeTier;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider does not implement this method; aggregators skip it.
    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("failed: {0}")]
    Failed(String),
}

/// An unspent output as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub value: u64,
    /// Big-endian hex, as shown by block explorers.
    pub txid: String,
    pub vout: u32,
    pub confirmations: u64,
    pub script: Script,
}

impl Utxo {
    /// `txid:vout`
    pub fn id(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }

    /// Whether `id` names this output, either as `txid` or `txid:vout`.
    pub fn matches(&self, id: &str) -> bool {
        match id.split_once(':') {
            Some((txid, vout)) => {
                txid.eq_ignore_ascii_case(&self.txid) && vout.parse::<u32>().ok() == Some(self.vout)
            }
            None => id.eq_ignore_ascii_case(&self.txid),
        }
    }
}

/// Satoshi-per-byte rate for each fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRates {
    pub s: u64,
    pub m: u64,
    pub l: u64,
    pub xl: u64,
}

impl FeeRates {
    pub fn rate(&self, tier: FeeTier) -> u64 {
        match tier {
            FeeTier::S => self.s,
            FeeTier::M => self.m,
            FeeTier::L => self.l,
            FeeTier::XL => self.xl,
        }
    }
}

/// A source of chain data and a sink for signed transactions.
pub trait Provider {
    /// Price of one BTC in `currency`.
    fn price(&self, currency: &str) -> Result<f64, ProviderError>;

    /// Confirmed balance of `address` in satoshi.
    fn balance(&self, address: &str) -> Result<u64, ProviderError>;

    fn fees(&self) -> Result<FeeRates, ProviderError>;

    /// Unspent outputs of all `addresses`.
    fn utxos(&self, addresses: &[String]) -> Result<Vec<Utxo>, ProviderError>;

    /// Broadcast a serialized transaction given as hex.
    fn push(&self, hex: &str) -> Result<(), ProviderError>;

    /// Hash of the chain tip.
    fn latest(&self) -> Result<String, ProviderError>;

    /// Height of the block with the given hash.
    fn height(&self, _hash: &str) -> Result<u64, ProviderError> {
        Err(ProviderError::NotSupported("height".into()))
    }

    /// Hash of the block following `hash`, `None` at the tip.
    fn next_of(&self, _hash: &str) -> Result<Option<String>, ProviderError> {
        Err(ProviderError::NotSupported("next_of".into()))
    }

    /// Name used in log lines.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn price(&self, currency: &str) -> Result<f64, ProviderError> {
        (**self).price(currency)
    }

    fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        (**self).balance(address)
    }

    fn fees(&self) -> Result<FeeRates, ProviderError> {
        (**self).fees()
    }

    fn utxos(&self, addresses: &[String]) -> Result<Vec<Utxo>, ProviderError> {
        (**self).utxos(addresses)
    }

    fn push(&self, hex: &str) -> Result<(), ProviderError> {
        (**self).push(hex)
    }

    fn latest(&self) -> Result<String, ProviderError> {
        (**self).latest()
    }

    fn height(&self, hash: &str) -> Result<u64, ProviderError> {
        (**self).height(hash)
    }

    fn next_of(&self, hash: &str) -> Result<Option<String>, ProviderError> {
        (**self).next_of(hash)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
