//! # Policy Module
//!
//! Matching rules for the two free-text inputs the engine compares against
//! literals: the brand and the reported defects.
//!
//! The defaults reproduce the storefront's literal comparisons exactly.
//! `PricingPolicy::normalized()` opts into the lenient rules.

use crate::device::Defect;
use serde::{Deserialize, Serialize};

/// Brands that earn the premium.
pub const PREMIUM_BRANDS: [&str; 2] = ["apple", "samsung"];

/// How the brand is compared against [`PREMIUM_BRANDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrandMatch {
    /// Case-sensitive, byte-for-byte. `"Apple"` earns nothing.
    #[default]
    Exact,
    /// Surrounding whitespace trimmed, ASCII case ignored.
    CaseInsensitive,
}

impl BrandMatch {
    /// Check whether `brand` earns the premium.
    #[must_use]
    pub fn is_premium(self, brand: &str) -> bool {
        match self {
            Self::Exact => PREMIUM_BRANDS.contains(&brand),
            Self::CaseInsensitive => {
                let brand = brand.trim();
                PREMIUM_BRANDS
                    .iter()
                    .any(|premium| premium.eq_ignore_ascii_case(brand))
            }
        }
    }
}

/// How reported defect strings are matched to a [`Defect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefectMatch {
    /// Only the engine literals match, case-sensitively.
    #[default]
    Literal,
    /// The engine literals and the checklist labels, ASCII case ignored.
    Checklist,
}

impl DefectMatch {
    /// Check whether a single reported string names `defect`.
    #[must_use]
    pub fn matches(self, defect: Defect, reported: &str) -> bool {
        match self {
            Self::Literal => reported == defect.literal(),
            Self::Checklist => {
                let reported = reported.trim();
                reported.eq_ignore_ascii_case(defect.literal())
                    || reported.eq_ignore_ascii_case(defect.checklist_label())
            }
        }
    }

    /// Check whether any reported string names `defect`.
    #[must_use]
    pub fn reported(self, defect: Defect, reported: &[String]) -> bool {
        reported.iter().any(|r| self.matches(defect, r))
    }
}

/// The complete set of matching rules used by a `ValuationEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    pub brand_match: BrandMatch,
    pub defect_match: DefectMatch,
}

impl PricingPolicy {
    /// Literal comparisons, as the storefront shipped.
    #[must_use]
    pub fn literal() -> Self {
        Self::default()
    }

    /// Case-insensitive brands and checklist-aware defects.
    #[must_use]
    pub fn normalized() -> Self {
        Self {
            brand_match: BrandMatch::CaseInsensitive,
            defect_match: DefectMatch::Checklist,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
