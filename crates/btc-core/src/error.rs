use thiserror::Error;

/// Bitcoin primitive errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BtcError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid bech32: {0}")]
    InvalidBech32(String),

    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    #[error("unsupported version byte: 0x{0:02x}")]
    UnsupportedVersion(u8),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

impl From<hex::FromHexError> for BtcError {
    fn from(e: hex::FromHexError) -> Self {
        BtcError::InvalidHex(e.to_string())
    }
}
