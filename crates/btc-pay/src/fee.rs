//! Fee specifications: a raw satoshi amount or a provider fee tier.
//!
//! A tier may carry a marker, written before or after it. `-` carves the fee
//! out of the amount being sent; `+` puts it on top, same as no marker.

use std::fmt;
use std::str::FromStr;

use crate::error::PayError;
use crate::provider::FeeRates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeTier {
    S,
    M,
    L,
    XL,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::S, FeeTier::M, FeeTier::L, FeeTier::XL];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeTier::S => "S",
            FeeTier::M => "M",
            FeeTier::L => "L",
            FeeTier::XL => "XL",
        }
    }
}

impl FromStr for FeeTier {
    type Err = PayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeeTier::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PayError::InvalidFee(format!("can't understand the fee: {s:?}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSpec {
    /// Fixed fee in satoshi, paid on top.
    Satoshi(u64),
    /// Tier rate times the estimated size.
    Tier { tier: FeeTier, carve_out: bool },
}

impl FeeSpec {
    /// Whether this spec needs the provider's fee table.
    pub fn needs_rates(&self) -> bool {
        matches!(self, FeeSpec::Tier { .. })
    }

    /// Fee in satoshi for a transaction of `size` bytes.
    ///
    /// Negative when the fee is carved out of the amount.
    pub fn resolve(&self, size: u64, rates: Option<&FeeRates>) -> Result<i64, PayError> {
        match *self {
            FeeSpec::Satoshi(sat) => i64::try_from(sat)
                .map_err(|_| PayError::InvalidFee(format!("fee {sat} is too large"))),
            FeeSpec::Tier { tier, carve_out } => {
                let rates = rates.ok_or_else(|| {
                    PayError::InvalidFee(format!("no fee rates to price tier {}", tier.as_str()))
                })?;
                let fee = rates
                    .rate(tier)
                    .checked_mul(size)
                    .and_then(|f| i64::try_from(f).ok())
                    .ok_or_else(|| {
                        PayError::InvalidFee(format!("fee for tier {} overflows", tier.as_str()))
                    })?;
                Ok(if carve_out { -fee } else { fee })
            }
        }
    }
}

impl FromStr for FeeSpec {
    type Err = PayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u64>()
                .map(FeeSpec::Satoshi)
                .map_err(|e| PayError::InvalidFee(format!("{s:?}: {e}")));
        }

        let (name, marker) = if let Some(rest) = s.strip_prefix(['+', '-']) {
            (rest, s.chars().next())
        } else if let Some(rest) = s.strip_suffix(['+', '-']) {
            (rest, s.chars().last())
        } else {
            (s, None)
        };
        let tier: FeeTier = name.parse()?;
        Ok(FeeSpec::Tier {
            tier,
            carve_out: marker == Some('-'),
        })
    }
}

impl From<u64> for FeeSpec {
    fn from(satoshi: u64) -> Self {
        FeeSpec::Satoshi(satoshi)
    }
}

impl fmt::Display for FeeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeSpec::Satoshi(sat) => write!(f, "{sat}"),
            FeeSpec::Tier { tier, carve_out: true } => write!(f, "-{}", tier.as_str()),
            FeeSpec::Tier { tier, carve_out: false } => write!(f, "{}", tier.as_str()),
        }
    }
}
