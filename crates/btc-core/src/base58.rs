//! Base58 and Base58Check codec (Bitcoin alphabet).
//!
//! Leading zero bytes map one-to-one onto leading `'1'` characters, so
//! `decode(encode(x)) == x` holds for every byte string.

use crate::error::BtcError;
use crate::hashes::sha256d;

/// The Bitcoin Base58 alphabet (no `0`, `O`, `I`, `l`).
pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encode bytes as Base58.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Base58 string into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, BtcError> {
    bs58::decode(text).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, .. } => BtcError::InvalidBase58(
            format!("invalid character '{character}' in '{text}'"),
        ),
        other => BtcError::InvalidBase58(other.to_string()),
    })
}

/// Base58Check checksum: first 4 bytes of SHA-256d.
pub fn check(bytes: &[u8]) -> [u8; 4] {
    let digest = sha256d(bytes);
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&digest[..4]);
    checksum
}

/// Encode `payload ‖ check(payload)` as Base58.
pub fn encode_check(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&check(payload));
    encode(&data)
}

/// Decode a Base58Check string and return the payload without its checksum.
pub fn decode_check(text: &str) -> Result<Vec<u8>, BtcError> {
    let mut data = decode(text)?;
    if data.len() < 5 {
        return Err(BtcError::InvalidBase58(format!(
            "'{text}' is too short for Base58Check ({} bytes)",
            data.len()
        )));
    }
    let split = data.len() - 4;
    let expected = check(&data[..split]);
    if data[split..] != expected {
        return Err(BtcError::InvalidChecksum(format!(
            "Base58Check checksum mismatch in '{text}'"
        )));
    }
    data.truncate(split);
    Ok(data)
}

/// Hex-level variant of [`encode`].
pub fn encode_hex(hex_bytes: &str) -> Result<String, BtcError> {
    Ok(encode(&hex::decode(hex_bytes)?))
}

/// Hex-level variant of [`decode`]; returns lowercase hex.
pub fn decode_hex(text: &str) -> Result<String, BtcError> {
    Ok(hex::encode(decode(text)?))
}

/// Hex-level variant of [`check`]; returns 8 lowercase hex digits.
pub fn check_hex(hex_bytes: &str) -> Result<String, BtcError> {
    Ok(hex::encode(check(&hex::decode(hex_bytes)?)))
}
