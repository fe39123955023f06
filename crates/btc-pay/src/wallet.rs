//! The payment orchestrator.
//!
//! A payment selects UTXOs of the source keys in provider order, prices the
//! fee from the estimated size, builds and signs a transaction paying the
//! target with change going back to the change address, and pushes it.

use std::collections::HashMap;

use btc_core::{KeyPair, TxBuilder};
use zeroize::Zeroizing;

use crate::amount::Amount;
use crate::config::WalletConfig;
use crate::dry::Dry;
use crate::error::PayError;
use crate::fee::FeeSpec;
use crate::observer::{PaymentEvent, PaymentObserver, TracingObserver};
use crate::provider::{FeeRates, Provider, Utxo};

/// Size estimate of a transaction without inputs, in bytes.
pub const BASE_TX_SIZE: u64 = 100;
/// Size estimate added per input, in bytes.
pub const INPUT_SIZE: u64 = 180;

/// What to pay, to whom, and from which keys.
#[derive(Clone)]
pub struct PayRequest {
    pub amount: Amount,
    pub fee: FeeSpec,
    /// Private keys as 64 hex digits or WIF.
    pub sources: Vec<Zeroizing<String>>,
    pub target: String,
    pub change: String,
    /// UTXO ids to leave alone, as `txid` or `txid:vout`.
    pub skip_utxo: Vec<String>,
}

impl PayRequest {
    pub fn new(amount: Amount, fee: FeeSpec, sources: &[&str], target: &str, change: &str) -> Self {
        Self {
            amount,
            fee,
            sources: sources.iter().map(|k| Zeroizing::new(k.to_string())).collect(),
            target: target.to_string(),
            change: change.to_string(),
            skip_utxo: Vec::new(),
        }
    }

    pub fn skip(mut self, ids: &[&str]) -> Self {
        self.skip_utxo.extend(ids.iter().map(|id| id.to_string()));
        self
    }
}

impl std::fmt::Debug for PayRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayRequest")
            .field("amount", &self.amount)
            .field("fee", &self.fee)
            .field("sources", &self.sources.len())
            .field("target", &self.target)
            .field("change", &self.change)
            .field("skip_utxo", &self.skip_utxo)
            .finish()
    }
}

pub struct Wallet {
    provider: Box<dyn Provider>,
    observer: Box<dyn PaymentObserver>,
    config: WalletConfig,
}

impl Wallet {
    /// Wallet with the default configuration and a `tracing` observer.
    pub fn new(provider: impl Provider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            observer: Box::new(TracingObserver),
            config: WalletConfig::default(),
        }
    }

    /// Wallet honouring `config`; with `dry_run` nothing is ever pushed.
    pub fn from_config(provider: impl Provider + 'static, config: WalletConfig) -> Self {
        let provider: Box<dyn Provider> = if config.dry_run {
            Box::new(Dry::new(provider))
        } else {
            Box::new(provider)
        };
        Self {
            provider,
            observer: Box::new(TracingObserver),
            config,
        }
    }

    pub fn with_observer(mut self, observer: impl PaymentObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// A fresh private key as 64 hex digits.
    pub fn generate(&self) -> Zeroizing<String> {
        KeyPair::generate(self.config.network).priv_hex()
    }

    /// Address of a private key, in the configured format.
    pub fn create(&self, key: &str) -> Result<String, PayError> {
        let key = KeyPair::new(key, Some(self.config.network))?;
        self.address_of(&key)
    }

    pub fn balance(&self, address: &str) -> Result<u64, PayError> {
        Ok(self.provider.balance(address)?)
    }

    pub fn fees(&self) -> Result<FeeRates, PayError> {
        Ok(self.provider.fees()?)
    }

    pub fn price(&self, currency: &str) -> Result<f64, PayError> {
        Ok(self.provider.price(currency)?)
    }

    pub fn latest(&self) -> Result<String, PayError> {
        Ok(self.provider.latest()?)
    }

    /// Send a payment and return its txid.
    pub fn pay(&self, request: &PayRequest) -> Result<String, PayError> {
        let network = self.config.network;
        let keys = request
            .sources
            .iter()
            .map(|k| KeyPair::new(k, Some(network)))
            .collect::<Result<Vec<_>, _>>()?;

        // A UTXO may pay either address form of a key.
        let mut signers: HashMap<String, usize> = HashMap::with_capacity(keys.len() * 2);
        let mut addresses = Vec::with_capacity(keys.len());
        for (idx, key) in keys.iter().enumerate() {
            signers.insert(key.base58(), idx);
            signers.insert(key.bech32()?, idx);
            addresses.push(self.address_of(key)?);
        }

        let requested = match request.amount {
            Amount::Satoshi(sat) => sat,
            Amount::Max => self.total_balance(&addresses)?,
        };
        if requested == 0 {
            return Err(PayError::InvalidAmount("nothing to send".into()));
        }

        let utxos = self.provider.utxos(&addresses)?;
        self.observer
            .on_event(&PaymentEvent::UtxosFound { count: utxos.len() });

        let (selected, unspent, size) = self.select(&utxos, requested, &request.skip_utxo);

        let rates = if request.fee.needs_rates() {
            Some(self.provider.fees()?)
        } else {
            None
        };
        let fee = request.fee.resolve(size, rates.as_ref())?;
        self.observer.on_event(&PaymentEvent::FeeResolved {
            spec: request.fee.to_string(),
            satoshi: fee,
            size,
        });

        let fee_abs = fee.unsigned_abs();
        let amount = if fee < 0 {
            if fee_abs >= requested {
                return Err(PayError::FeeExceedsAmount {
                    fee: fee_abs,
                    amount: requested,
                });
            }
            requested - fee_abs
        } else {
            requested
        };
        if unspent < amount {
            return Err(PayError::InsufficientFunds {
                needed: amount,
                available: unspent,
            });
        }

        // Every input gets its key before anything is signed.
        let mut builder = TxBuilder::new();
        for utxo in &selected {
            let address = utxo
                .script
                .address(network)
                .ok_or_else(|| PayError::UnmatchedKey(utxo.script.to_hex()))?;
            let idx = *signers
                .get(&address)
                .ok_or_else(|| PayError::UnmatchedKey(address.clone()))?;
            builder.input(&utxo.txid, utxo.vout, utxo.script.clone(), keys[idx].clone())?;
        }
        builder.output(amount, &request.target)?;

        let extra_fee = fee_abs.max(self.config.min_fee);
        let tx = builder.build(unspent, true, extra_fee, &request.change)?;
        let signed = tx.sign()?;

        self.observer.on_event(&PaymentEvent::TxPrepared {
            txid: signed.txid().to_string(),
            inputs: tx.inputs().len(),
            outputs: tx.outputs().len(),
            amount,
            unspent,
            fee_paid: unspent.saturating_sub(tx.output_total()?),
            size,
            target: request.target.clone(),
            change: request.change.clone(),
        });

        self.provider.push(&signed.hex())?;
        self.observer.on_event(&PaymentEvent::TxPushed {
            txid: signed.txid().to_string(),
        });
        Ok(signed.txid().to_string())
    }

    /// Greedy selection in provider order until the value exceeds `amount`.
    ///
    /// Returns the chosen UTXOs, their total value and the size estimate.
    fn select<'a>(
        &self,
        utxos: &'a [Utxo],
        amount: u64,
        skip: &[String],
    ) -> (Vec<&'a Utxo>, u64, u64) {
        let mut selected = Vec::new();
        let mut unspent: u64 = 0;
        let mut size = BASE_TX_SIZE;
        for utxo in utxos {
            if skip.iter().any(|id| utxo.matches(id)) {
                self.observer.on_event(&PaymentEvent::UtxoSkipped {
                    txid: utxo.txid.clone(),
                    vout: utxo.vout,
                });
                continue;
            }
            unspent = unspent.saturating_add(utxo.value);
            size += INPUT_SIZE;
            self.observer.on_event(&PaymentEvent::UtxoSelected {
                txid: utxo.txid.clone(),
                vout: utxo.vout,
                value: utxo.value,
                confirmations: utxo.confirmations,
            });
            selected.push(utxo);
            if unspent > amount {
                break;
            }
        }
        (selected, unspent, size)
    }

    fn total_balance(&self, addresses: &[String]) -> Result<u64, PayError> {
        let mut total: u64 = 0;
        for address in addresses {
            total = total.saturating_add(self.provider.balance(address)?);
        }
        Ok(total)
    }

    fn address_of(&self, key: &KeyPair) -> Result<String, PayError> {
        if self.config.base58 {
            Ok(key.base58())
        } else {
            Ok(key.bech32()?)
        }
    }
}
