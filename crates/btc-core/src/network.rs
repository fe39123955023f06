use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BtcError;

/// Supported Bitcoin networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtcNetwork {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl BtcNetwork {
    /// All networks, in the order address detection tries them.
    pub const ALL: [BtcNetwork; 3] = [BtcNetwork::Mainnet, BtcNetwork::Testnet, BtcNetwork::Regtest];

    /// Human-readable part of native SegWit addresses.
    pub fn hrp(self) -> &'static str {
        match self {
            BtcNetwork::Mainnet => "bc",
            BtcNetwork::Testnet => "tb",
            BtcNetwork::Regtest => "bcrt",
        }
    }

    /// Base58Check version byte of P2PKH addresses.
    pub fn p2pkh_version(self) -> u8 {
        match self {
            BtcNetwork::Mainnet => 0x00,
            BtcNetwork::Testnet | BtcNetwork::Regtest => 0x6f,
        }
    }

    /// Base58Check version byte of WIF private keys.
    pub fn wif_version(self) -> u8 {
        match self {
            BtcNetwork::Mainnet => 0x80,
            BtcNetwork::Testnet | BtcNetwork::Regtest => 0xef,
        }
    }

    /// Network implied by a WIF version byte.
    pub fn from_wif_version(version: u8) -> Result<Self, BtcError> {
        match version {
            0x80 => Ok(BtcNetwork::Mainnet),
            0xef => Ok(BtcNetwork::Testnet),
            other => Err(BtcError::UnsupportedVersion(other)),
        }
    }
}

impl std::fmt::Display for BtcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtcNetwork::Mainnet => write!(f, "mainnet"),
            BtcNetwork::Testnet => write!(f, "testnet"),
            BtcNetwork::Regtest => write!(f, "regtest"),
        }
    }
}

impl FromStr for BtcNetwork {
    type Err = BtcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(BtcNetwork::Mainnet),
            "testnet" => Ok(BtcNetwork::Testnet),
            "regtest" => Ok(BtcNetwork::Regtest),
            other => Err(BtcError::InvalidNetwork(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrps() {
        assert_eq!(BtcNetwork::Mainnet.hrp(), "bc");
        assert_eq!(BtcNetwork::Testnet.hrp(), "tb");
        assert_eq!(BtcNetwork::Regtest.hrp(), "bcrt");
    }

    #[test]
    fn p2pkh_versions() {
        assert_eq!(BtcNetwork::Mainnet.p2pkh_version(), 0x00);
        assert_eq!(BtcNetwork::Testnet.p2pkh_version(), 0x6f);
        assert_eq!(BtcNetwork::Regtest.p2pkh_version(), 0x6f);
    }

    #[test]
    fn wif_version_roundtrip() {
        assert_eq!(
            BtcNetwork::from_wif_version(BtcNetwork::Mainnet.wif_version()).unwrap(),
            BtcNetwork::Mainnet
        );
        assert_eq!(
            BtcNetwork::from_wif_version(BtcNetwork::Testnet.wif_version()).unwrap(),
            BtcNetwork::Testnet
        );
    }

    #[test]
    fn unknown_wif_version_rejected() {
        assert_eq!(
            BtcNetwork::from_wif_version(0x05),
            Err(BtcError::UnsupportedVersion(0x05))
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(BtcNetwork::Mainnet.to_string(), "mainnet");
        assert_eq!(BtcNetwork::Testnet.to_string(), "testnet");
        assert_eq!(BtcNetwork::Regtest.to_string(), "regtest");
    }

    #[test]
    fn parse_names() {
        assert_eq!("MAINNET".parse::<BtcNetwork>().unwrap(), BtcNetwork::Mainnet);
        assert_eq!("regtest".parse::<BtcNetwork>().unwrap(), BtcNetwork::Regtest);
        assert!("signet".parse::<BtcNetwork>().is_err());
    }

    #[test]
    fn default_is_mainnet() {
        assert_eq!(BtcNetwork::default(), BtcNetwork::Mainnet);
    }
}
