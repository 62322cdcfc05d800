//! # Money Module
//!
//! Fixed-point currency for the Valuation Engine.
//!
//! No floating-point arithmetic anywhere in the core:
//! - Amounts are whole cents (`u64`)
//! - Multipliers are whole percents (`120` = ×1.20)
//! - Products of rates are carried exactly and rounded once, at the end

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cents per currency unit.
const CENTS_PER_UNIT: u64 = 100;

/// Denominator of a [`Rate`].
const PERCENT: u128 = 100;

// =============================================================================
// PRICE
// =============================================================================

/// A non-negative monetary amount in whole cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from whole cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(CENTS_PER_UNIT))
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Saturating addition of two prices.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

/// Errors from parsing a [`Price`] out of text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("empty amount")]
    Empty,

    #[error("invalid amount '{0}': expected digits with at most two decimals")]
    Malformed(String),

    #[error("amount '{0}' is too large")]
    Overflow(String),
}

impl FromStr for Price {
    type Err = MoneyError;

    /// Parse `"480"`, `"480.5"` or `"480.50"`. Signs and more than two
    /// fractional digits are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) || frac.len() > 2 {
            return Err(MoneyError::Malformed(s.to_string()));
        }

        let units: u64 = whole
            .parse()
            .map_err(|_| MoneyError::Overflow(s.to_string()))?;
        let cents = match frac.len() {
            0 => 0,
            1 => u64::from(frac.as_bytes()[0] - b'0') * 10,
            _ => frac
                .parse::<u64>()
                .map_err(|_| MoneyError::Malformed(s.to_string()))?,
        };

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .ok_or_else(|| MoneyError::Overflow(s.to_string()))
    }
}

// =============================================================================
// RATE
// =============================================================================

/// A multiplier expressed in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u32);

impl Rate {
    /// The no-op multiplier (×1.00).
    pub const IDENTITY: Self = Self(100);

    /// Create a rate from whole percent.
    #[must_use]
    pub const fn percent(value: u32) -> Self {
        Self(value)
    }

    /// The rate in whole percent.
    #[must_use]
    pub const fn as_percent(self) -> u32 {
        self.0
    }

    /// Check if this rate leaves a price unchanged.
    #[must_use]
    pub const fn is_identity(self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// ACCUMULATOR
// =============================================================================

/// Exact running product `base × Π rates / 100^n`.
///
/// The numerator is kept in `u128` cents and the denominator as a power of
/// 100, so compounding never loses precision. Rounding to whole cents
/// happens only in [`Accumulator::round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    numerator: u128,
    scale: u32,
}

impl Accumulator {
    /// Start from a base price.
    #[must_use]
    pub fn new(base: Price) -> Self {
        Self {
            numerator: u128::from(base.cents()),
            scale: 0,
        }
    }

    /// Multiply the running value by a rate.
    pub fn apply(&mut self, rate: Rate) {
        self.numerator = self.numerator.saturating_mul(u128::from(rate.as_percent()));
        self.scale = self.scale.saturating_add(1);
    }

    /// Round the running value half-up to whole cents.
    #[must_use]
    pub fn round(&self) -> Price {
        let denominator = PERCENT.saturating_pow(self.scale);
        let quotient = self.numerator / denominator;
        let remainder = self.numerator % denominator;
        let rounded = if remainder.saturating_mul(2) >= denominator {
            quotient.saturating_add(1)
        } else {
            quotient
        };
        Price(u64::try_from(rounded).unwrap_or(u64::MAX))
    }

    /// Check if the exact running value is strictly below a price.
    #[must_use]
    pub fn is_below(&self, price: Price) -> bool {
        let denominator = PERCENT.saturating_pow(self.scale);
        self.numerator < u128::from(price.cents()).saturating_mul(denominator)
    }
}

// =============================================================================
// TESTS
// =============================================================================
