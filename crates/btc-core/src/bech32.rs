//! Bech32 codec for native SegWit witness programs, on top of the `bech32`
//! crate.
//!
//! Encoding always uses the Bech32 constant. Decoding accepts a checksum
//! that matches either the Bech32 or the Bech32m constant, whatever the
//! witness version.

use ::bech32::primitives::decode::UncheckedHrpstring;
use ::bech32::primitives::iter::{ByteIterExt, Fe32IterExt};
use ::bech32::{Bech32, Bech32m, Fe32, Hrp};

use crate::error::BtcError;

/// Highest witness version a SegWit address can carry.
pub const MAX_WITNESS_VERSION: u8 = 16;

/// A decoded witness address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessAddress {
    pub hrp: String,
    pub version: u8,
    pub program: Vec<u8>,
}

/// Encode a witness program as `hrp 1 data checksum`.
pub fn encode(hrp: &str, version: u8, program: &[u8]) -> Result<String, BtcError> {
    if version > MAX_WITNESS_VERSION {
        return Err(BtcError::InvalidBech32(format!(
            "witness version {version} out of range"
        )));
    }
    let hrp = Hrp::parse(&hrp.to_ascii_lowercase())
        .map_err(|e| BtcError::InvalidBech32(format!("human-readable part '{hrp}': {e}")))?;
    let version = Fe32::try_from(version)
        .map_err(|e| BtcError::InvalidBech32(format!("witness version: {e}")))?;

    Ok(program
        .iter()
        .copied()
        .bytes_to_fes()
        .with_checksum::<Bech32>(&hrp)
        .with_witness_version(version)
        .chars()
        .collect())
}

/// Decode a witness address, verifying its checksum.
pub fn decode(addr: &str) -> Result<WitnessAddress, BtcError> {
    let lower = addr.to_ascii_lowercase();
    let unchecked = UncheckedHrpstring::new(&lower)
        .map_err(|e| BtcError::InvalidBech32(format!("'{addr}': {e}")))?;

    let mut checked = if unchecked.has_valid_checksum::<Bech32>() {
        unchecked.remove_checksum::<Bech32>()
    } else if unchecked.has_valid_checksum::<Bech32m>() {
        unchecked.remove_checksum::<Bech32m>()
    } else {
        return Err(BtcError::InvalidChecksum(format!(
            "Bech32 checksum mismatch in '{addr}'"
        )));
    };

    let hrp = checked.hrp().to_lowercase();
    let version = checked.remove_witness_version().ok_or_else(|| {
        BtcError::InvalidBech32(format!("'{addr}' carries no witness version"))
    })?;
    Ok(WitnessAddress {
        hrp,
        version: version.to_u8(),
        program: checked.byte_iter().collect(),
    })
}

/// Witness program of a Bech32 address.
pub fn witness(addr: &str) -> Result<Vec<u8>, BtcError> {
    decode(addr).map(|w| w.program)
}

/// Witness version (the first data symbol) of a Bech32 address.
pub fn version(addr: &str) -> Result<u8, BtcError> {
    decode(addr).map(|w| w.version)
}
