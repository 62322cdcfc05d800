//! # Device Module
//!
//! The input contract of the Valuation Engine.
//!
//! Categorical fields are parsed from the exact lower-case literals the
//! storefront form emits. Anything else is kept verbatim as `Unrecognized`
//! so the engine can degrade to its default rule instead of failing.
//! Numeric fields arrive as strings and go through [`Reading::parse`].

use crate::money::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// DEVICE TYPE
// =============================================================================

/// Category of the device being traded in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceType {
    Smartphone,
    Laptop,
    Tablet,
    /// Any value outside the three known literals, kept as given.
    Unrecognized(String),
}

impl DeviceType {
    /// Parse from the form literal. Comparison is exact.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "smartphone" => Self::Smartphone,
            "laptop" => Self::Laptop,
            "tablet" => Self::Tablet,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The literal this type is written as.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Smartphone => "smartphone",
            Self::Laptop => "laptop",
            Self::Tablet => "tablet",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Starting price for the category, or `None` if unrecognized.
    #[must_use]
    pub fn base_price(&self) -> Option<Price> {
        match self {
            Self::Smartphone => Some(Price::from_units(400)),
            Self::Laptop => Some(Price::from_units(700)),
            Self::Tablet => Some(Price::from_units(300)),
            Self::Unrecognized(_) => None,
        }
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for DeviceType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<DeviceType> for String {
    fn from(value: DeviceType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CONDITION
// =============================================================================

/// Self-reported physical condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    New,
    Used,
    Damaged,
    Unrecognized(String),
}

impl Condition {
    /// Parse from the form literal. Comparison is exact.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "new" => Self::New,
            "used" => Self::Used,
            "damaged" => Self::Damaged,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "new",
            Self::Used => "used",
            Self::Damaged => "damaged",
            Self::Unrecognized(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NUMERIC READINGS
// =============================================================================

/// Result of reading the leading integer out of a free-text field.
///
/// `NotANumber` is the named default for text with no leading integer.
/// It never satisfies a numeric threshold: a capacity that reads as
/// `NotANumber` earns no bonus, and a purchase year that reads as
/// `NotANumber` has no defined age and falls into the oldest band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reading {
    Number(i64),
    NotANumber,
}

impl Reading {
    /// Read the leading integer of `raw`.
    ///
    /// Leading Unicode whitespace is skipped and one optional sign is
    /// accepted, then the run of decimal digits is read. Trailing text is
    /// ignored (`"128GB"` reads as 128). No digits reads as `NotANumber`.
    /// A digit run too long for `i64` saturates to `i64::MAX`, or to
    /// `i64::MIN` after a `-`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return Self::NotANumber;
        }

        // Only overflow can fail here: the run is all ASCII digits.
        let signed = if negative {
            format!("-{}", &rest[..digits_len])
        } else {
            rest[..digits_len].to_string()
        };
        match signed.parse::<i64>() {
            Ok(value) => Self::Number(value),
            Err(_) if negative => Self::Number(i64::MIN),
            Err(_) => Self::Number(i64::MAX),
        }
    }

    /// The parsed value, if any.
    #[must_use]
    pub fn value(self) -> Option<i64> {
        match self {
            Self::Number(value) => Some(value),
            Self::NotANumber => None,
        }
    }

    /// Check `self >= threshold`. `NotANumber` is never at or above anything.
    #[must_use]
    pub fn at_least(self, threshold: i64) -> bool {
        self.value().is_some_and(|value| value >= threshold)
    }
}

// =============================================================================
// DEFECTS
// =============================================================================

/// Defects that carry a price penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Defect {
    ScreenCrack,
    BatteryIssue,
    MalfunctioningButtons,
}

impl Defect {
    /// All penalized defects, in the order penalties are applied.
    pub const ALL: [Self; 3] = [
        Self::ScreenCrack,
        Self::BatteryIssue,
        Self::MalfunctioningButtons,
    ];

    /// The exact string the engine matches by default.
    #[must_use]
    pub const fn literal(self) -> &'static str {
        match self {
            Self::ScreenCrack => "screen crack",
            Self::BatteryIssue => "battery issue",
            Self::MalfunctioningButtons => "malfunctioning buttons",
        }
    }

    /// The label the storefront checklist offers for this defect.
    #[must_use]
    pub const fn checklist_label(self) -> &'static str {
        match self {
            Self::ScreenCrack => "Screen cracks",
            Self::BatteryIssue => "Battery issues",
            Self::MalfunctioningButtons => "Button malfunctions",
        }
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

// =============================================================================
// DEVICE DESCRIPTION
// =============================================================================

/// A device as described by the seller.
///
/// Field names on the wire match the storefront form (`deviceType`,
/// `storageCapacity`, ...). The caller owns it; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: DeviceType,
    pub brand: String,
    /// Capacity with a unit suffix, e.g. `"128GB"`.
    pub storage_capacity: String,
    /// Four-digit year, e.g. `"2022"`.
    pub year_of_purchase: String,
    pub condition: Condition,
    #[serde(default)]
    pub defects: Vec<String>,
}

impl DeviceDescription {
    /// Create a description with no defects.
    #[must_use]
    pub fn new(
        device_type: DeviceType,
        brand: impl Into<String>,
        storage_capacity: impl Into<String>,
        year_of_purchase: impl Into<String>,
        condition: Condition,
    ) -> Self {
        Self {
            device_type,
            brand: brand.into(),
            storage_capacity: storage_capacity.into(),
            year_of_purchase: year_of_purchase.into(),
            condition,
            defects: Vec::new(),
        }
    }

    /// Add a reported defect.
    #[must_use]
    pub fn with_defect(mut self, defect: impl Into<String>) -> Self {
        self.defects.push(defect.into());
        self
    }

    /// Storage capacity as read by the engine.
    #[must_use]
    pub fn storage_reading(&self) -> Reading {
        Reading::parse(&self.storage_capacity)
    }

    /// Purchase year as read by the engine.
    #[must_use]
    pub fn year_reading(&self) -> Reading {
        Reading::parse(&self.year_of_purchase)
    }
}

// =============================================================================
// TESTS
// =============================================================================
