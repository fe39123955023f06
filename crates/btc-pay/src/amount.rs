//! Payment amounts: satoshi integers, `"<decimal>BTC"` strings, or `MAX`.

use std::fmt;
use std::str::FromStr;

use crate::error::PayError;

pub const SATOSHI_PER_BTC: u64 = 100_000_000;

/// Decimal places of one satoshi.
const BTC_DECIMALS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    Satoshi(u64),
    /// Whole balance of the source addresses.
    Max,
}

impl Amount {
    pub fn from_btc(text: &str) -> Result<Self, PayError> {
        parse_btc(text).map(Amount::Satoshi)
    }
}

impl From<u64> for Amount {
    fn from(satoshi: u64) -> Self {
        Amount::Satoshi(satoshi)
    }
}

impl FromStr for Amount {
    type Err = PayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") {
            return Ok(Amount::Max);
        }
        if let Some(btc) = s.strip_suffix("BTC") {
            return Amount::from_btc(btc);
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u64>()
                .map(Amount::Satoshi)
                .map_err(|e| PayError::InvalidAmount(format!("{s:?}: {e}")));
        }
        Err(PayError::InvalidAmount(format!("can't understand the amount {s:?}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Satoshi(sat) => write!(f, "{sat}"),
            Amount::Max => write!(f, "MAX"),
        }
    }
}

/// Exact decimal BTC to satoshi.
fn parse_btc(text: &str) -> Result<u64, PayError> {
    let malformed = || PayError::InvalidAmount(format!("can't understand the amount \"{text}BTC\""));

    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(malformed());
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if frac.len() > BTC_DECIMALS {
        return Err(PayError::InvalidAmount(format!(
            "\"{text}BTC\" is more precise than one satoshi"
        )));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| malformed())?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<width$}", width = BTC_DECIMALS)
            .parse()
            .map_err(|_| malformed())?
    };
    whole
        .checked_mul(SATOSHI_PER_BTC)
        .and_then(|sat| sat.checked_add(frac))
        .ok_or_else(|| PayError::InvalidAmount(format!("\"{text}BTC\" is too large")))
}
