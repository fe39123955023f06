//! Provider aggregators.
//!
//! [`FirstOf`] returns the first successful answer; [`BestOf`] asks every
//! provider and returns the answer most of them agree on. Both skip
//! providers that report [`ProviderError::NotSupported`].

use crate::provider::{FeeRates, Provider, ProviderError, Utxo};

/// Tries providers in order until one succeeds.
pub struct FirstOf {
    providers: Vec<Box<dyn Provider>>,
}

impl FirstOf {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    fn first_of<T>(
        &self,
        method: &str,
        call: impl Fn(&dyn Provider) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        for (idx, provider) in self.providers.iter().enumerate() {
            tracing::debug!(provider = provider.name(), method, "Calling provider");
            match call(provider.as_ref()) {
                Ok(value) => return Ok(value),
                Err(ProviderError::NotSupported(_)) => {}
                Err(e) => {
                    tracing::warn!(
                        provider_idx = idx,
                        provider = provider.name(),
                        method,
                        error = %e,
                        "Provider failed, trying next"
                    );
                }
            }
        }
        Err(all_failed(self.providers.len(), method))
    }
}

impl Provider for FirstOf {
    fn price(&self, currency: &str) -> Result<f64, ProviderError> {
        self.first_of("price", |p| p.price(currency))
    }

    fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        self.first_of("balance", |p| p.balance(address))
    }

    fn fees(&self) -> Result<FeeRates, ProviderError> {
        self.first_of("fees", |p| p.fees())
    }

    fn utxos(&self, addresses: &[String]) -> Result<Vec<Utxo>, ProviderError> {
        self.first_of("utxos", |p| p.utxos(addresses))
    }

    fn push(&self, hex: &str) -> Result<(), ProviderError> {
        self.first_of("push", |p| p.push(hex))
    }

    fn latest(&self) -> Result<String, ProviderError> {
        self.first_of("latest", |p| p.latest())
    }

    fn height(&self, hash: &str) -> Result<u64, ProviderError> {
        self.first_of("height", |p| p.height(hash))
    }

    fn next_of(&self, hash: &str) -> Result<Option<String>, ProviderError> {
        self.first_of("next_of", |p| p.next_of(hash))
    }

    fn name(&self) -> &str {
        "first-of"
    }
}

/// Asks every provider and returns the majority answer.
///
/// Ties go to the answer seen first.
pub struct BestOf {
    providers: Vec<Box<dyn Provider>>,
}

impl BestOf {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    fn best_of<T: PartialEq>(
        &self,
        method: &str,
        call: impl Fn(&dyn Provider) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        // (answer, votes) in first-seen order.
        let mut tally: Vec<(T, usize)> = Vec::new();
        for (idx, provider) in self.providers.iter().enumerate() {
            match call(provider.as_ref()) {
                Ok(value) => match tally.iter_mut().find(|(seen, _)| *seen == value) {
                    Some((_, votes)) => *votes += 1,
                    None => tally.push((value, 1)),
                },
                Err(ProviderError::NotSupported(_)) => {}
                Err(e) => {
                    tracing::warn!(
                        provider_idx = idx,
                        provider = provider.name(),
                        method,
                        error = %e,
                        "Provider failed"
                    );
                }
            }
        }

        let mut best: Option<(T, usize)> = None;
        for (value, votes) in tally {
            if best.as_ref().map_or(true, |(_, top)| votes > *top) {
                best = Some((value, votes));
            }
        }
        match best {
            Some((value, votes)) => {
                tracing::debug!(method, votes, "Majority answer chosen");
                Ok(value)
            }
            None => Err(all_failed(self.providers.len(), method)),
        }
    }
}

impl Provider for BestOf {
    fn price(&self, currency: &str) -> Result<f64, ProviderError> {
        self.best_of("price", |p| p.price(currency))
    }

    fn balance(&self, address: &str) -> Result<u64, ProviderError> {
        self.best_of("balance", |p| p.balance(address))
    }

    fn fees(&self) -> Result<FeeRates, ProviderError> {
        self.best_of("fees", |p| p.fees())
    }

    fn utxos(&self, addresses: &[String]) -> Result<Vec<Utxo>, ProviderError> {
        self.best_of("utxos", |p| p.utxos(addresses))
    }

    fn push(&self, hex: &str) -> Result<(), ProviderError> {
        self.best_of("push", |p| p.push(hex))
    }

    fn latest(&self) -> Result<String, ProviderError> {
        self.best_of("latest", |p| p.latest())
    }

    fn height(&self, hash: &str) -> Result<u64, ProviderError> {
        self.best_of("height", |p| p.height(hash))
    }

    fn next_of(&self, hash: &str) -> Result<Option<String>, ProviderError> {
        self.best_of("next_of", |p| p.next_of(hash))
    }

    fn name(&self) -> &str {
        "best-of"
    }
}

fn all_failed(count: usize, method: &str) -> ProviderError {
    ProviderError::Failed(format!(
        "no providers out of {count} managed to succeed at {method}()"
    ))
}
