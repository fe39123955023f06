//! Recognition and construction of the two standard single-key scripts.

use crate::base58;
use crate::bech32;
use crate::error::BtcError;
use crate::network::BtcNetwork;

pub const OP_0: u8 = 0x00;
pub const OP_DUP: u8 = 0x76;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_CHECKSIG: u8 = 0xac;

/// Push of a 20-byte hash.
const PUSH_20: u8 = 0x14;

const P2PKH_LEN: usize = 25;
const P2WPKH_LEN: usize = 22;

/// Template a script matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG`
    P2pkh,
    /// `OP_0 <20>`
    P2wpkh,
    Unknown,
}

/// An output script (scriptPubKey).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    bytes: Vec<u8>,
}

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_hex(script_hex: &str) -> Result<Self, BtcError> {
        Ok(Self::new(hex::decode(script_hex)?))
    }

    pub fn p2pkh(hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(P2PKH_LEN);
        bytes.push(OP_DUP);
        bytes.push(OP_HASH160);
        bytes.push(PUSH_20);
        bytes.extend_from_slice(hash);
        bytes.push(OP_EQUALVERIFY);
        bytes.push(OP_CHECKSIG);
        Self { bytes }
    }

    pub fn p2wpkh(hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(P2WPKH_LEN);
        bytes.push(OP_0);
        bytes.push(PUSH_20);
        bytes.extend_from_slice(hash);
        Self { bytes }
    }

    /// Script paying to an address.
    ///
    /// An address with the Bech32 prefix of any known network yields
    /// P2WPKH; anything else is read as a Base58Check P2PKH address.
    pub fn for_address(address: &str) -> Result<Self, BtcError> {
        if is_bech32_address(address) {
            let decoded = bech32::decode(address)?;
            if decoded.version != 0 {
                return Err(BtcError::InvalidAddress(format!(
                    "witness version {} is not supported in '{address}'",
                    decoded.version
                )));
            }
            let hash: [u8; 20] = decoded.program.as_slice().try_into().map_err(|_| {
                BtcError::InvalidAddress(format!(
                    "'{address}' carries a {}-byte program, expected 20",
                    decoded.program.len()
                ))
            })?;
            return Ok(Self::p2wpkh(&hash));
        }

        let payload = base58::decode_check(address)?;
        if payload.len() != 21 {
            return Err(BtcError::InvalidAddress(format!(
                "'{address}' decodes to {} bytes, expected 21",
                payload.len()
            )));
        }
        let version = payload[0];
        if !BtcNetwork::ALL.iter().any(|n| n.p2pkh_version() == version) {
            return Err(BtcError::UnsupportedVersion(version));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Self::p2pkh(&hash))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn kind(&self) -> ScriptKind {
        let b = &self.bytes;
        if b.len() == P2PKH_LEN
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == PUSH_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
        {
            ScriptKind::P2pkh
        } else if b.len() == P2WPKH_LEN && b[0] == OP_0 && b[1] == PUSH_20 {
            ScriptKind::P2wpkh
        } else {
            ScriptKind::Unknown
        }
    }

    pub fn is_p2pkh(&self) -> bool {
        self.kind() == ScriptKind::P2pkh
    }

    pub fn is_p2wpkh(&self) -> bool {
        self.kind() == ScriptKind::P2wpkh
    }

    /// The 20-byte hash the script pays to, if it matches a template.
    pub fn hash160(&self) -> Option<[u8; 20]> {
        let offset = match self.kind() {
            ScriptKind::P2pkh => 3,
            ScriptKind::P2wpkh => 2,
            ScriptKind::Unknown => return None,
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.bytes[offset..offset + 20]);
        Some(hash)
    }

    /// The address that can spend this script on `network`.
    pub fn address(&self, network: BtcNetwork) -> Option<String> {
        let hash = self.hash160()?;
        match self.kind() {
            ScriptKind::P2wpkh => bech32::encode(network.hrp(), 0, &hash).ok(),
            ScriptKind::P2pkh => {
                let mut payload = Vec::with_capacity(21);
                payload.push(network.p2pkh_version());
                payload.extend_from_slice(&hash);
                Some(base58::encode_check(&payload))
            }
            ScriptKind::Unknown => None,
        }
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Whether the address starts with `<hrp>1` for one of the known networks.
pub fn is_bech32_address(address: &str) -> bool {
    let lower = address.to_ascii_lowercase();
    BtcNetwork::ALL
        .iter()
        .any(|n| lower.starts_with(&format!("{}1", n.hrp())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH: &str = "76a914c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa988ac";
    const P2WPKH: &str = "0014751e76e8199196d454941c45d1b3a323f1433bd6";

    fn script(h: &str) -> Script {
        Script::from_hex(h).unwrap()
    }

    #[test]
    fn parses_p2pkh_script() {
        let s = script(P2PKH);
        assert_eq!(s.kind(), ScriptKind::P2pkh);
        assert!(s.is_p2pkh());
        assert!(!s.is_p2wpkh());
    }

    #[test]
    fn extracts_hash160_from_p2pkh() {
        assert_eq!(
            hex::encode(script(P2PKH).hash160().unwrap()),
            "c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa9"
        );
    }

    #[test]
    fn p2pkh_address_per_network() {
        let s = script("76a914c48a1737b35a9f9d9e3b624a910f1e22f7e80bbc88ac");
        assert_eq!(
            s.address(BtcNetwork::Mainnet).unwrap(),
            "1JvCsJtLmCxEk7ddZFnVkGXpr9uhxZPmJi"
        );
        assert_eq!(
            s.address(BtcNetwork::Testnet).unwrap(),
            "mySAAMyKaEPVXE7FGpksaBk9i9WQt3QKi8"
        );
    }

    #[test]
    fn parses_p2wpkh_script() {
        let s = script(P2WPKH);
        assert_eq!(s.kind(), ScriptKind::P2wpkh);
        assert_eq!(
            hex::encode(s.hash160().unwrap()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
        assert_eq!(
            s.address(BtcNetwork::Mainnet).unwrap(),
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
        );
    }

    #[test]
    fn rejects_p2sh_script() {
        let s = script("a914c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa987");
        assert_eq!(s.kind(), ScriptKind::Unknown);
        assert!(s.address(BtcNetwork::Mainnet).is_none());
        assert!(s.hash160().is_none());
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert_eq!(script("76a914").kind(), ScriptKind::Unknown);
        assert_eq!(script(&format!("{P2PKH}00")).kind(), ScriptKind::Unknown);
        assert_eq!(script(&P2WPKH[..42]).kind(), ScriptKind::Unknown);
        assert_eq!(script(&format!("{P2WPKH}00")).kind(), ScriptKind::Unknown);
        assert_eq!(script("").kind(), ScriptKind::Unknown);
    }

    #[test]
    fn rejects_wrong_opcodes() {
        for bad in [
            "00a914c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa988ac",
            "7600141c4b1e5c95a4687da3f7c932bf39a3a89bdb3fa988ac",
            "76a915c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa988ac",
            "76a914c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa987ac",
            "76a914c14b1e5c95a4687da3f7c932bf39a3a89bdb3fa988ad",
            "0114751e76e8199196d454941c45d1b3a323f1433bd6",
            "0015751e76e8199196d454941c45d1b3a323f1433bd6",
        ] {
            let s = script(bad);
            assert_eq!(s.kind(), ScriptKind::Unknown, "{bad}");
            assert!(s.address(BtcNetwork::Mainnet).is_none());
        }
    }

    #[test]
    fn script_for_bech32_address() {
        let s = Script::for_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4").unwrap();
        assert_eq!(s.to_hex(), P2WPKH);
        let s = Script::for_address("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4").unwrap();
        assert_eq!(s.to_hex(), P2WPKH);
    }

    #[test]
    fn script_for_base58_address() {
        let s = Script::for_address("1JvCsJtLmCxEk7ddZFnVkGXpr9uhxZPmJi").unwrap();
        assert_eq!(s.to_hex(), "76a914c48a1737b35a9f9d9e3b624a910f1e22f7e80bbc88ac");
        let s = Script::for_address("mySAAMyKaEPVXE7FGpksaBk9i9WQt3QKi8").unwrap();
        assert!(s.is_p2pkh());
    }

    #[test]
    fn script_for_testnet_and_regtest_bech32() {
        let tb = Script::for_address("tb1qcj9pwdant20em83mvf9fzrc7ytm7szau7zty74").unwrap();
        let bcrt = Script::for_address("bcrt1qcj9pwdant20em83mvf9fzrc7ytm7szauutjffu").unwrap();
        assert_eq!(tb, bcrt);
        assert!(tb.is_p2wpkh());
    }

    #[test]
    fn script_for_p2sh_address_is_rejected() {
        // Version byte 0x05.
        let err = Script::for_address("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy").unwrap_err();
        assert_eq!(err, BtcError::UnsupportedVersion(0x05));
    }

    #[test]
    fn script_for_garbage_address_is_rejected() {
        assert!(Script::for_address("not_an_address").is_err());
        assert!(Script::for_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5").is_err());
    }

    #[test]
    fn address_roundtrip_through_script() {
        for addr in [
            "1JvCsJtLmCxEk7ddZFnVkGXpr9uhxZPmJi",
            "bc1qcj9pwdant20em83mvf9fzrc7ytm7szau5ysh9x",
        ] {
            let s = Script::for_address(addr).unwrap();
            assert_eq!(s.address(BtcNetwork::Mainnet).unwrap(), addr);
        }
    }
}
