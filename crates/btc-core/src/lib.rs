//! Bitcoin primitives for the payment engine.
//!
//! Base58/Base58Check and Bech32 codecs, secp256k1 key pairs, P2PKH and
//! P2WPKH script handling, and legacy transaction building and signing.

pub mod base58;
pub mod bech32;
pub mod error;
pub mod hashes;
pub mod key;
pub mod network;
pub mod script;
pub mod tx;
pub mod txbuilder;

pub use error::BtcError;
pub use key::KeyPair;
pub use network::BtcNetwork;
pub use script::{Script, ScriptKind};
pub use tx::{SignedTx, TxInput, TxOutput, UnsignedTx};
pub use txbuilder::TxBuilder;
