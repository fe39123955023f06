//! In-memory provider with fixed answers.

use std::sync::Mutex;

use crate::provider::{FeeRates, Provider, ProviderError, Utxo};

pub const FAKE_PRICE: f64 = 4_000.0;
pub const FAKE_BALANCE: u64 = 100_000_000;
pub const FAKE_LATEST: &str = "00000000000000000008df8a6e1b61d1136803ac9791b8725235c9f780b4ed71";
pub const FAKE_FEES: FeeRates = FeeRates {
    s: 12,
    m: 45,
    l: 100,
    xl: 200,
};

/// Answers every query with constants and keeps every pushed payload.
#[derive(Debug, Default)]
pub struct FakeProvider {
    utxos: Vec<Utxo>,
    pushed: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `utxos` for any address query.
    pub fn with_utxos(utxos: Vec<Utxo>) -> Self {
        Self {
            utxos,
            pushed: Mutex::new(Vec::new()),
        }
    }

    /// Hex payloads pushed so far, oldest first.
    pub fn pushed(&self) -> Vec<String> {
        self.pushed
            .lock()
            .map(|pushed| pushed.clone())
            .unwrap_or_default()
    }
}

impl Provider for FakeProvider {
    fn price(&self, _currency: &str) -> Result<f64, ProviderError> {
        Ok(FAKE_PRICE)
    }

    fn balance(&self, _address: &str) -> Result<u64, ProviderError> {
        Ok(FAKE_BALANCE)
    }

    fn fees(&self) -> Result<FeeRates, ProviderError> {
        Ok(FAKE_FEES)
    }

    fn utxos(&self, _addresses: &[String]) -> Result<Vec<Utxo>, ProviderError> {
        Ok(self.utxos.clone())
    }

    fn push(&self, hex: &str) -> Result<(), ProviderError> {
        self.pushed
            .lock()
            .map_err(|_| ProviderError::Failed("push log is poisoned".into()))?
            .push(hex.to_string());
        Ok(())
    }

    fn latest(&self) -> Result<String, ProviderError> {
        Ok(FAKE_LATEST.to_string())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
