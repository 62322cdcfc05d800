//! # Configuration
//!
//! Optional JSON configuration file for the CLI.
//!
//! ```json
//! {
//!   "policy": { "brand_match": "case-insensitive", "defect_match": "checklist" },
//!   "reference_year": 2026,
//!   "log_level": "debug"
//! }
//! ```
//!
//! Every field is optional. Command-line flags override file values.

use crate::cli::CliError;
use buyback_core::PricingPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default tracing filter when neither a flag, `RUST_LOG`, nor the file sets one.
pub const DEFAULT_LOG_FILTER: &str = "buyback=info";

/// Settings loaded from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Matching rules for brand and defects.
    pub policy: PricingPolicy,
    /// Fixed year to measure device age against. Defaults to the current year.
    pub reference_year: Option<i64>,
    /// tracing filter directive, e.g. `"debug"` or `"buyback=trace"`.
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load from `path`, or use defaults when no path is given.
    ///
    /// A path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply command-line overrides. `--log-level` is not folded in here:
    /// it outranks `RUST_LOG`, which outranks the file.
    #[must_use]
    pub fn with_overrides(mut self, normalize: bool, reference_year: Option<i64>) -> Self {
        if normalize {
            self.policy = PricingPolicy::normalized();
        }
        if reference_year.is_some() {
            self.reference_year = reference_year;
        }
        self
    }

    /// The reference year: configured value, else the current UTC year.
    #[must_use]
    pub fn reference_year(&self) -> i64 {
        self.reference_year.unwrap_or_else(current_year)
    }
}

/// The current calendar year in UTC.
#[must_use]
pub fn current_year() -> i64 {
    i64::from(time::OffsetDateTime::now_utc().year())
}

// =============================================================================
// TESTS
// =============================================================================
