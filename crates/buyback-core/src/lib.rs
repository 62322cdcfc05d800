//! # Buyback Core
//!
//! The deterministic Valuation Engine for device trade-ins.
//!
//! This crate is pure: no I/O, no clock, no floating point. Everything that
//! touches the outside world (files, logging, the current date) lives in the
//! `buyback` app, which feeds this crate plain values.
//!
//! ## Modules
//!
//! - [`money`]: fixed-point `Price` and `Rate`
//! - [`device`]: the `DeviceDescription` input contract
//! - [`policy`]: brand and defect matching rules
//! - [`valuation`]: the estimate itself
//! - [`form`]: sell-form validation
//! - [`review`]: trade-in request ledger
//!
//! ## Example
//!
//! ```
//! use buyback_core::{estimate, Condition, DeviceDescription, DeviceType, Price};
//!
//! let device = DeviceDescription::new(
//!     DeviceType::Smartphone,
//!     "samsung",
//!     "128GB",
//!     "2026",
//!     Condition::New,
//! );
//! assert_eq!(estimate(&device, 2026), Price::from_cents(50160));
//! ```

pub mod device;
pub mod form;
pub mod money;
pub mod policy;
pub mod review;
pub mod valuation;

pub use device::{Condition, Defect, DeviceDescription, DeviceType, Reading};
pub use form::{DeliveryMethod, FieldError, FormErrors, SellForm, ValidatedSellForm};
pub use money::{Accumulator, MoneyError, Price, Rate};
pub use policy::{BrandMatch, DefectMatch, PricingPolicy};
pub use review::{
    Customer, DeviceSummary, LedgerSummary, RequestId, RequestLedger, RequestStatus,
    ReviewAction, ReviewError, TradeInRequest,
};
pub use valuation::{
    estimate, Adjustment, DepreciationBand, Step, StorageTier, Valuation, ValuationEngine,
    ValuationError, FLOOR_PRICE,
};
