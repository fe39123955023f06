use crate::provider::{FeeRates, Provider, ProviderError, Utxo};

/// Delegates every call except [`Provider::push`], which is dropped.
#[derive(Debug)]
pub struct Dry<P> {
    inner: P,
}

impl<P: Provider> Dry<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Provider> Provider for Dry<P> {
    fn price(&self, currency: &str) -> Result<f64, ProviderError> {
        self.inner.price(currency)
    }

    fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        self.inner.balance(address)
    }

    fn fees(&self) -> Result<FeeRates, ProviderError> {
        self.inner.fees()
    }

    fn utxos(&self, addresses: &[String]) -> Result<Vec<Utxo>, ProviderError> {
        self.inner.utxos(addresses)
    }

    fn push(&self, hex: &str) -> Result<(), ProviderError> {
        tracing::info!(
            provider = self.inner.name(),
            bytes = hex.len() / 2,
            "Transaction not pushed, dry mode is on"
        );
        Ok(())
    }

    fn latest(&self) -> Result<String, ProviderError> {
        self.inner.latest()
    }

    fn height(&self, hash: &str) -> Result<u64, ProviderError> {
        self.inner.height(hash)
    }

    fn next_of(&self, hash: &str) -> Result<Option<String>, ProviderError> {
        self.inner.next_of(hash)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
