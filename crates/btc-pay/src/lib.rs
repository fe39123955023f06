//! Bitcoin payments on top of `btc-core`.
//!
//! The [`Wallet`] orchestrator pays from a set of private keys through a
//! pluggable [`Provider`] for chain data and broadcasting.

pub mod amount;
pub mod config;
pub mod dry;
pub mod error;
pub mod failover;
pub mod fake;
pub mod fee;
pub mod observer;
pub mod provider;
pub mod wallet;

pub use amount::Amount;
pub use config::{load_config, ConfigError, WalletConfig};
pub use dry::Dry;
pub use error::PayError;
pub use failover::{BestOf, FirstOf};
pub use fake::FakeProvider;
pub use fee::{FeeSpec, FeeTier};
pub use observer::{NullObserver, PaymentEvent, PaymentObserver, TracingObserver};
pub use provider::{FeeRates, Provider, ProviderError, Utxo};
pub use wallet::{PayRequest, Wallet};
