//! # Valuation Engine
//!
//! Maps a [`DeviceDescription`] to an estimated resale [`Price`].
//!
//! The estimate is a base price by category followed by an ordered chain of
//! multiplicative adjustments:
//!
//! 1. Base price by device type (unrecognized type: 0, no floor)
//! 2. Brand premium
//! 3. Age depreciation band
//! 4. Condition
//! 5. Storage capacity bonus
//! 6. One penalty per reported defect
//! 7. Floor at [`FLOOR_PRICE`]
//!
//! Adjustments compound, so order matters only for the running values
//! reported in [`Valuation::adjustments`]; the final product is exact and
//! rounded to cents once.
//!
//! The engine never reads the clock. Age is measured against a reference
//! year supplied by the caller.

use crate::device::{Condition, Defect, DeviceDescription, DeviceType, Reading};
use crate::money::{Accumulator, Price, Rate};
use crate::policy::PricingPolicy;
use serde::{Deserialize, Serialize};

/// Minimum estimate for any recognized device type.
pub const FLOOR_PRICE: Price = Price::from_units(50);

/// Multiplier for a premium brand.
pub const BRAND_PREMIUM: Rate = Rate::percent(120);

// =============================================================================
// ADJUSTMENT TABLES
// =============================================================================

/// Age band a device falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationBand {
    /// Age ≤ 1, including negative ages (purchase year after the reference).
    UpToOneYear,
    UpToThreeYears,
    UpToFiveYears,
    /// Age > 5, or no readable purchase year.
    Older,
}

impl DepreciationBand {
    /// Pick the band for an age in years. The first matching threshold wins.
    #[must_use]
    pub fn for_age(age: Option<i64>) -> Self {
        match age {
            Some(age) if age <= 1 => Self::UpToOneYear,
            Some(age) if age <= 3 => Self::UpToThreeYears,
            Some(age) if age <= 5 => Self::UpToFiveYears,
            _ => Self::Older,
        }
    }

    #[must_use]
    pub const fn rate(self) -> Rate {
        match self {
            Self::UpToOneYear => Rate::percent(95),
            Self::UpToThreeYears => Rate::percent(85),
            Self::UpToFiveYears => Rate::percent(70),
            Self::Older => Rate::percent(50),
        }
    }
}

/// Storage bonus tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    /// Below 128, or no readable capacity.
    Standard,
    /// 128 up to (not including) 256.
    Large,
    /// 256 and above.
    ExtraLarge,
}

impl StorageTier {
    #[must_use]
    pub fn for_capacity(capacity: Reading) -> Self {
        if capacity.at_least(256) {
            Self::ExtraLarge
        } else if capacity.at_least(128) {
            Self::Large
        } else {
            Self::Standard
        }
    }

    #[must_use]
    pub const fn rate(self) -> Rate {
        match self {
            Self::Standard => Rate::IDENTITY,
            Self::Large => Rate::percent(110),
            Self::ExtraLarge => Rate::percent(115),
        }
    }
}

/// Multiplier for a condition. Unrecognized conditions are a no-op.
#[must_use]
pub fn condition_rate(condition: &Condition) -> Rate {
    match condition {
        Condition::New | Condition::Unrecognized(_) => Rate::IDENTITY,
        Condition::Used => Rate::percent(80),
        Condition::Damaged => Rate::percent(50),
    }
}

/// Multiplier for a reported defect.
#[must_use]
pub const fn defect_rate(defect: Defect) -> Rate {
    match defect {
        Defect::ScreenCrack => Rate::percent(70),
        Defect::BatteryIssue => Rate::percent(85),
        Defect::MalfunctioningButtons => Rate::percent(90),
    }
}

// =============================================================================
// VALUATION RECORD
// =============================================================================

/// What an adjustment was applied for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    BrandPremium { brand: String },
    Depreciation { age: Option<i64>, band: DepreciationBand },
    Condition { condition: Condition },
    Storage { tier: StorageTier },
    Defect { defect: Defect },
}

/// One multiplicative adjustment and the price right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub step: Step,
    pub rate: Rate,
    /// Running price after this step, rounded to cents for display.
    pub running: Price,
}

/// A complete, explainable estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub device_type: DeviceType,
    pub reference_year: i64,
    /// Base price for the category. Zero for an unrecognized type.
    pub base: Price,
    /// Adjustments in the order they were applied.
    pub adjustments: Vec<Adjustment>,
    /// Product of base and adjustments, before the floor.
    pub computed: Price,
    /// The estimate.
    pub price: Price,
    /// Whether the floor raised the estimate.
    pub floor_applied: bool,
}

impl Valuation {
    /// Valuation for a device type the engine has no base price for.
    fn unpriced(device_type: DeviceType, reference_year: i64) -> Self {
        Self {
            device_type,
            reference_year,
            base: Price::ZERO,
            adjustments: Vec::new(),
            computed: Price::ZERO,
            price: Price::ZERO,
            floor_applied: false,
        }
    }

    /// Format as plain text, one line per step.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("base ({}): {}\n", self.device_type, self.base));
        for adjustment in &self.adjustments {
            let label = match &adjustment.step {
                Step::BrandPremium { brand } => format!("brand '{brand}'"),
                Step::Depreciation { age: Some(age), .. } => format!("age {age}y"),
                Step::Depreciation { age: None, .. } => String::from("age unknown"),
                Step::Condition { condition } => format!("condition '{condition}'"),
                Step::Storage { tier } => format!("storage {tier:?}"),
                Step::Defect { defect } => format!("defect '{defect}'"),
            };
            output.push_str(&format!(
                "  {label} {} -> {}\n",
                adjustment.rate, adjustment.running
            ));
        }
        if self.floor_applied {
            output.push_str(&format!("floor: {}\n", FLOOR_PRICE));
        }
        output.push_str(&format!("estimate: {}\n", self.price));
        output
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Rejections from [`ValuationEngine::appraise_strict`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuationError {
    #[error("device type is empty")]
    EmptyDeviceType,

    #[error("unrecognized device type '{0}'")]
    UnrecognizedDeviceType(String),

    #[error("brand is empty")]
    EmptyBrand,

    #[error("unrecognized condition '{0}'")]
    UnrecognizedCondition(String),

    #[error("year of purchase '{0}' is not a number")]
    UnparseableYear(String),

    #[error("year of purchase {0} is not a positive year")]
    NonPositiveYear(i64),

    #[error("year of purchase {year} is after the reference year {reference_year}")]
    YearInFuture { year: i64, reference_year: i64 },

    #[error("storage capacity '{0}' is not a number")]
    UnparseableStorage(String),

    #[error("storage capacity {0} is not positive")]
    NonPositiveStorage(i64),
}

// =============================================================================
// ENGINE
// =============================================================================

/// The Valuation Engine.
///
/// Stateless apart from its matching policy; `Copy`, and safe to share
/// across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValuationEngine {
    policy: PricingPolicy,
}

impl ValuationEngine {
    #[must_use]
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> PricingPolicy {
        self.policy
    }

    /// Estimate a price. Never fails; see [`ValuationEngine::appraise`].
    #[must_use]
    pub fn estimate(&self, device: &DeviceDescription, reference_year: i64) -> Price {
        self.appraise(device, reference_year).price
    }

    /// Estimate a price and record every step taken.
    ///
    /// Unrecognized or unreadable input degrades to the default rule of the
    /// step it feeds; only an unrecognized device type short-circuits, to
    /// zero and without the floor.
    #[must_use]
    pub fn appraise(&self, device: &DeviceDescription, reference_year: i64) -> Valuation {
        let Some(base) = device.device_type.base_price() else {
            return Valuation::unpriced(device.device_type.clone(), reference_year);
        };

        let mut acc = Accumulator::new(base);
        let mut adjustments = Vec::new();
        let mut apply = |step: Step, rate: Rate| {
            acc.apply(rate);
            adjustments.push(Adjustment {
                step,
                rate,
                running: acc.round(),
            });
        };

        if self.policy.brand_match.is_premium(&device.brand) {
            apply(
                Step::BrandPremium {
                    brand: device.brand.clone(),
                },
                BRAND_PREMIUM,
            );
        }

        let age = device
            .year_reading()
            .value()
            .map(|year| reference_year.saturating_sub(year));
        let band = DepreciationBand::for_age(age);
        apply(Step::Depreciation { age, band }, band.rate());

        apply(
            Step::Condition {
                condition: device.condition.clone(),
            },
            condition_rate(&device.condition),
        );

        let tier = StorageTier::for_capacity(device.storage_reading());
        if !tier.rate().is_identity() {
            apply(Step::Storage { tier }, tier.rate());
        }

        for defect in Defect::ALL {
            if self.policy.defect_match.reported(defect, &device.defects) {
                apply(Step::Defect { defect }, defect_rate(defect));
            }
        }

        let computed = acc.round();
        let floor_applied = acc.is_below(FLOOR_PRICE);
        let price = if floor_applied { FLOOR_PRICE } else { computed };

        Valuation {
            device_type: device.device_type.clone(),
            reference_year,
            base,
            adjustments,
            computed,
            price,
            floor_applied,
        }
    }

    /// Validate the description, then appraise it.
    ///
    /// Accepted inputs price exactly as [`ValuationEngine::appraise`] would.
    pub fn appraise_strict(
        &self,
        device: &DeviceDescription,
        reference_year: i64,
    ) -> Result<Valuation, ValuationError> {
        check(device, reference_year)?;
        Ok(self.appraise(device, reference_year))
    }
}

/// Reject descriptions the lenient path would silently default.
fn check(device: &DeviceDescription, reference_year: i64) -> Result<(), ValuationError> {
    if let DeviceType::Unrecognized(raw) = &device.device_type {
        if raw.trim().is_empty() {
            return Err(ValuationError::EmptyDeviceType);
        }
        return Err(ValuationError::UnrecognizedDeviceType(raw.clone()));
    }

    if device.brand.trim().is_empty() {
        return Err(ValuationError::EmptyBrand);
    }

    if let Condition::Unrecognized(raw) = &device.condition {
        return Err(ValuationError::UnrecognizedCondition(raw.clone()));
    }

    match device.year_reading() {
        Reading::NotANumber => {
            return Err(ValuationError::UnparseableYear(
                device.year_of_purchase.clone(),
            ));
        }
        Reading::Number(year) if year <= 0 => {
            return Err(ValuationError::NonPositiveYear(year));
        }
        Reading::Number(year) if year > reference_year => {
            return Err(ValuationError::YearInFuture {
                year,
                reference_year,
            });
        }
        Reading::Number(_) => {}
    }

    match device.storage_reading() {
        Reading::NotANumber => Err(ValuationError::UnparseableStorage(
            device.storage_capacity.clone(),
        )),
        Reading::Number(capacity) if capacity <= 0 => {
            Err(ValuationError::NonPositiveStorage(capacity))
        }
        Reading::Number(_) => Ok(()),
    }
}

/// Estimate with the literal matching policy.
#[must_use]
pub fn estimate(device: &DeviceDescription, reference_year: i64) -> Price {
    ValuationEngine::default().estimate(device, reference_year)
}

// =============================================================================
// TESTS
// =============================================================================
