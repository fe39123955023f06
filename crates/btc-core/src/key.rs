//! secp256k1 key pairs: generation, import, signing and address derivation.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::base58;
use crate::bech32;
use crate::error::BtcError;
use crate::hashes;
use crate::network::BtcNetwork;

/// WIF suffix marking a compressed public key.
const COMPRESSED_MARKER: u8 = 0x01;

/// A secp256k1 key pair bound to a network.
///
/// The private scalar is always in `[1, n-1]`; construction fails otherwise.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    network: BtcNetwork,
    compressed: bool,
}

impl KeyPair {
    /// Generate a key from the OS random number generator.
    pub fn generate(network: BtcNetwork) -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
            network,
            compressed: true,
        }
    }

    /// Import a private key from 64 hex digits or a WIF string.
    ///
    /// A hex scalar defaults to mainnet. A WIF string carries its own
    /// network and compression flag. `network`, when given, always wins.
    pub fn new(input: &str, network: Option<BtcNetwork>) -> Result<Self, BtcError> {
        let input = input.trim();
        if input.len() == 64 && input.bytes().all(|b| b.is_ascii_hexdigit()) {
            let scalar = Zeroizing::new(hex::decode(input)?);
            return Self::from_scalar(&scalar, network.unwrap_or_default(), true);
        }

        let payload = Zeroizing::new(base58::decode_check(input)?);
        let detected = BtcNetwork::from_wif_version(payload[0])?;
        let body = &payload[1..];
        let (scalar, compressed) = match body.len() {
            33 if body[32] == COMPRESSED_MARKER => (&body[..32], true),
            32 => (body, false),
            n => {
                return Err(BtcError::InvalidPrivateKey(format!(
                    "unexpected WIF body of {n} bytes"
                )))
            }
        };
        Self::from_scalar(scalar, network.unwrap_or(detected), compressed)
    }

    /// Build a key pair from a raw 32-byte big-endian scalar.
    pub fn from_scalar(
        scalar: &[u8],
        network: BtcNetwork,
        compressed: bool,
    ) -> Result<Self, BtcError> {
        if scalar.len() != 32 {
            return Err(BtcError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                scalar.len()
            )));
        }
        let signing_key = SigningKey::from_slice(scalar).map_err(|_| {
            BtcError::InvalidPrivateKey("scalar is outside [1, n-1]".into())
        })?;
        Ok(Self {
            signing_key,
            network,
            compressed,
        })
    }

    pub fn network(&self) -> BtcNetwork {
        self.network
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Private scalar as 64 lowercase hex digits.
    pub fn priv_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// WIF export; [`KeyPair::new`] reads it back to an identical key.
    pub fn wif(&self) -> Zeroizing<String> {
        let mut payload = Zeroizing::new(Vec::with_capacity(34));
        payload.push(self.network.wif_version());
        payload.extend_from_slice(&self.signing_key.to_bytes());
        if self.compressed {
            payload.push(COMPRESSED_MARKER);
        }
        Zeroizing::new(base58::encode_check(&payload))
    }

    /// SEC1 public key: 33 bytes when compressed, 65 otherwise.
    pub fn pub_bytes(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .as_affine()
            .to_encoded_point(self.compressed)
            .as_bytes()
            .to_vec()
    }

    pub fn pub_hex(&self) -> String {
        hex::encode(self.pub_bytes())
    }

    pub fn hash160(&self) -> [u8; 20] {
        hashes::hash160(&self.pub_bytes())
    }

    /// Native SegWit (P2WPKH) address under the network's HRP.
    pub fn bech32(&self) -> Result<String, BtcError> {
        bech32::encode(self.network.hrp(), 0, &self.hash160())
    }

    /// Default address form, the same as [`KeyPair::bech32`].
    pub fn addr(&self) -> Result<String, BtcError> {
        self.bech32()
    }

    /// Legacy P2PKH address.
    pub fn base58(&self) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(self.network.p2pkh_version());
        payload.extend_from_slice(&self.hash160());
        base58::encode_check(&payload)
    }

    /// Sign a 32-byte digest; returns a low-S DER signature.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, BtcError> {
        let sig: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| BtcError::SigningError(format!("ECDSA signing failed: {e}")))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(sig.to_der().as_bytes().to_vec())
    }

    /// Check a DER signature over a digest. Malformed input yields `false`.
    pub fn verify(&self, digest: &[u8], der: &[u8]) -> bool {
        let Ok(sig) = Signature::from_der(der) else {
            return false;
        };
        self.signing_key
            .verifying_key()
            .verify_prehash(digest, &sig)
            .is_ok()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("pub", &self.pub_hex())
            .field("network", &self.network)
            .field("compressed", &self.compressed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE: &str = "fd2333686f49d8647e1ce8d5ef39c304520b08f3c756b67068b30a3db217dcb2";
    const ORDER_MINUS_ONE: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140";
    const ORDER: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn half_order() -> [u8; 32] {
        hex::decode("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0")
            .unwrap()
            .try_into()
            .unwrap()
    }

    #[test]
    fn generates_random_key() {
        let key = KeyPair::generate(BtcNetwork::Mainnet);
        assert_eq!(key.priv_hex().len(), 64);
        assert!(key.priv_hex().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(
            *key.priv_hex(),
            *KeyPair::generate(BtcNetwork::Mainnet).priv_hex()
        );
    }

    #[test]
    fn creates_key_from_hex() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        assert_eq!(*key.priv_hex(), PRIVATE);
        assert_eq!(key.network(), BtcNetwork::Mainnet);
        assert!(key.compressed());
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let key = KeyPair::new(&PRIVATE.to_uppercase(), None).unwrap();
        assert_eq!(*key.priv_hex(), PRIVATE);
    }

    #[test]
    fn derives_known_addresses() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        assert_eq!(key.base58(), "1JvCsJtLmCxEk7ddZFnVkGXpr9uhxZPmJi");
        assert_eq!(
            key.bech32().unwrap(),
            "bc1qcj9pwdant20em83mvf9fzrc7ytm7szau5ysh9x"
        );
        assert_eq!(key.addr().unwrap(), key.bech32().unwrap());
    }

    #[test]
    fn derives_network_specific_addresses() {
        let testnet = KeyPair::new(PRIVATE, Some(BtcNetwork::Testnet)).unwrap();
        assert_eq!(testnet.base58(), "mySAAMyKaEPVXE7FGpksaBk9i9WQt3QKi8");
        assert_eq!(
            testnet.bech32().unwrap(),
            "tb1qcj9pwdant20em83mvf9fzrc7ytm7szau7zty74"
        );
        let regtest = KeyPair::new(PRIVATE, Some(BtcNetwork::Regtest)).unwrap();
        assert_eq!(
            regtest.bech32().unwrap(),
            "bcrt1qcj9pwdant20em83mvf9fzrc7ytm7szauutjffu"
        );
    }

    #[test]
    fn returns_compressed_public_key() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        assert_eq!(
            key.pub_hex(),
            "02a03ec657271c2a12edff6139e7a1b1274e0b462d8d36ea6adde1d43fe2735763"
        );
    }

    #[test]
    fn imports_compressed_wif() {
        let key = KeyPair::new("L5hn2SvYjKwbWC8bvJSevPJA9vDbxUXJo2BU5uA6NSVDjBRkNdHL", None).unwrap();
        assert_eq!(*key.priv_hex(), PRIVATE);
        assert!(key.compressed());
        assert_eq!(key.network(), BtcNetwork::Mainnet);
        assert_eq!(key.base58(), "1JvCsJtLmCxEk7ddZFnVkGXpr9uhxZPmJi");
    }

    #[test]
    fn imports_uncompressed_wif() {
        let key = KeyPair::new("5Kjme2o7jfjGyTYBBGHEaPix6C9kGHf8f4tmCXrBjU58RA6wTHc", None).unwrap();
        assert_eq!(*key.priv_hex(), PRIVATE);
        assert!(!key.compressed());
        assert_eq!(key.pub_bytes().len(), 65);
        assert_eq!(key.base58(), "16LBpXMLoJLU3E4E7hYvZF1JxbPU7qj7M6");
    }

    #[test]
    fn imports_testnet_wif() {
        let key = KeyPair::new("cW4mVMvQAPdrfdbsJiFnHhoDn9X1cvczs4KwCKcbsZ9DyvZdKxRa", None).unwrap();
        assert_eq!(key.network(), BtcNetwork::Testnet);
        assert_eq!(*key.priv_hex(), PRIVATE);
    }

    #[test]
    fn network_override_wins_over_wif_version() {
        let key = KeyPair::new(
            "L5hn2SvYjKwbWC8bvJSevPJA9vDbxUXJo2BU5uA6NSVDjBRkNdHL",
            Some(BtcNetwork::Regtest),
        )
        .unwrap();
        assert_eq!(key.network(), BtcNetwork::Regtest);
    }

    #[test]
    fn wif_export_roundtrips() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        assert_eq!(
            *key.wif(),
            "L5hn2SvYjKwbWC8bvJSevPJA9vDbxUXJo2BU5uA6NSVDjBRkNdHL"
        );
        let key = KeyPair::generate(BtcNetwork::Testnet);
        let back = KeyPair::new(&key.wif(), None).unwrap();
        assert_eq!(*back.priv_hex(), *key.priv_hex());
        assert_eq!(back.network(), BtcNetwork::Testnet);
    }

    #[test]
    fn known_wif_for_scalar_one() {
        let key = KeyPair::new("KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn", None).unwrap();
        assert_eq!(
            key.bech32().unwrap(),
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
        );
        assert_eq!(key.base58(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    #[test]
    fn wif_checksum_mismatch_rejected() {
        let err = KeyPair::new("L5hn2SvYjKwbWC8bvJSevPJA9vDbxUXJo2BU5uA6NSVDjBRkNdHM", None)
            .unwrap_err();
        assert!(matches!(err, BtcError::InvalidChecksum(_)));
    }

    #[test]
    fn wif_with_unknown_version_rejected() {
        let mut payload = vec![0x05];
        payload.extend_from_slice(&hex::decode(PRIVATE).unwrap());
        payload.push(0x01);
        let wif = base58::encode_check(&payload);
        assert_eq!(
            KeyPair::new(&wif, None).unwrap_err(),
            BtcError::UnsupportedVersion(0x05)
        );
    }

    #[test]
    fn garbage_input_rejected() {
        assert!(KeyPair::new("not a key", None).is_err());
        assert!(KeyPair::new("", None).is_err());
    }

    #[test]
    fn scalar_bounds() {
        let zero = "0".repeat(64);
        assert!(matches!(
            KeyPair::new(&zero, None),
            Err(BtcError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            KeyPair::new(ORDER, None),
            Err(BtcError::InvalidPrivateKey(_))
        ));
        assert!(KeyPair::new(&"f".repeat(64), None).is_err());

        let one = format!("{}1", "0".repeat(63));
        assert!(KeyPair::new(&one, None).is_ok());
        let max = KeyPair::new(ORDER_MINUS_ONE, None).unwrap();
        assert_eq!(
            max.pub_hex(),
            "0379be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn signs_and_verifies() {
        let key = KeyPair::generate(BtcNetwork::Mainnet);
        let digest = hashes::sha256d(b"payload");
        let sig = key.sign(&digest).unwrap();
        assert!(key.verify(&digest, &sig));
        let other = hashes::sha256d(b"other payload");
        assert!(!key.verify(&other, &sig));
    }

    #[test]
    fn verify_returns_false_on_malformed_signature() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        let digest = hashes::sha256d(b"payload");
        assert!(!key.verify(&digest, &[]));
        assert!(!key.verify(&digest, &[0x30, 0x02, 0x01]));
        assert!(!key.verify(&digest, &[0xff; 72]));
    }

    #[test]
    fn signatures_are_low_s() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        for i in 0u32..64 {
            let digest = hashes::sha256d(&i.to_le_bytes());
            let der = key.sign(&digest).unwrap();
            let sig = Signature::from_der(&der).unwrap();
            let s: [u8; 32] = sig.s().to_bytes().into();
            assert!(s <= half_order(), "high S for digest {i}");
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        let digest = hashes::sha256d(b"payload");
        assert_eq!(key.sign(&digest).unwrap(), key.sign(&digest).unwrap());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let key = KeyPair::new(PRIVATE, None).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains(PRIVATE));
        assert!(debug.contains("KeyPair"));
    }
}
