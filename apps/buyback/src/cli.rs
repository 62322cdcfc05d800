//! # CLI Commands
//!
//! Implementation of the `buyback` subcommands.
//!
//! Each `cmd_*` function prints its result (text, or JSON when `json` is
//! set) and also returns it, so the commands can be driven from tests.

use buyback_core::{
    DeviceDescription, FormErrors, LedgerSummary, MoneyError, Price, RequestId, RequestLedger,
    ReviewError, SellForm, TradeInRequest, Valuation, ValuationEngine, ValuationError,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// =============================================================================
// ERRORS
// =============================================================================

/// Everything a command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Form(#[from] FormErrors),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("{0}")]
    InvalidArgument(String),
}

// =============================================================================
// HELPERS
// =============================================================================

/// Read and decode a JSON file.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appraise one device, leniently or strictly, and log the outcome.
fn appraise(
    engine: &ValuationEngine,
    device: &DeviceDescription,
    reference_year: i64,
    strict: bool,
) -> Result<Valuation, ValuationError> {
    let valuation = if strict {
        engine.appraise_strict(device, reference_year)?
    } else {
        engine.appraise(device, reference_year)
    };

    debug!(
        device_type = %device.device_type,
        brand = %device.brand,
        storage = %device.storage_capacity,
        year = %device.year_of_purchase,
        condition = %device.condition,
        defects = ?device.defects,
        reference_year,
        policy = ?engine.policy(),
        adjustments = ?valuation.adjustments,
        "appraised device"
    );
    if !valuation.device_type.is_recognized() {
        warn!(device_type = %device.device_type, "unrecognized device type, priced at zero");
    }
    info!(
        price = %valuation.price,
        computed = %valuation.computed,
        floor_applied = valuation.floor_applied,
        "estimate ready"
    );

    Ok(valuation)
}

// =============================================================================
// ESTIMATE
// =============================================================================

/// Estimate one device.
pub fn cmd_estimate(
    engine: &ValuationEngine,
    device: &DeviceDescription,
    reference_year: i64,
    strict: bool,
    breakdown: bool,
    json: bool,
) -> Result<Valuation, CliError> {
    let valuation = appraise(engine, device, reference_year, strict)?;

    if json {
        print_json(&valuation)?;
    } else if breakdown {
        print!("{}", valuation.to_text());
    } else {
        println!("{}", valuation.price);
    }

    Ok(valuation)
}

// =============================================================================
// BATCH
// =============================================================================

/// Result for one device of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_applied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    fn priced(index: usize, valuation: &Valuation) -> Self {
        Self {
            index,
            price_cents: Some(valuation.price.cents()),
            price: Some(valuation.price.to_string()),
            floor_applied: Some(valuation.floor_applied),
            error: None,
        }
    }

    fn rejected(index: usize, error: &ValuationError) -> Self {
        Self {
            index,
            price_cents: None,
            price: None,
            floor_applied: None,
            error: Some(error.to_string()),
        }
    }
}

/// Estimate every device in a JSON array file.
///
/// Under `strict`, invalid devices are reported per entry and the rest of
/// the batch is still priced.
pub fn cmd_batch(
    engine: &ValuationEngine,
    path: &Path,
    reference_year: i64,
    strict: bool,
    json: bool,
) -> Result<Vec<BatchEntry>, CliError> {
    let devices: Vec<DeviceDescription> = read_json(path)?;
    info!(count = devices.len(), path = %path.display(), "pricing batch");

    let entries: Vec<BatchEntry> = devices
        .iter()
        .enumerate()
        .map(
            |(index, device)| match appraise(engine, device, reference_year, strict) {
                Ok(valuation) => BatchEntry::priced(index, &valuation),
                Err(error) => {
                    warn!(index, %error, "device rejected");
                    BatchEntry::rejected(index, &error)
                }
            },
        )
        .collect();

    if json {
        print_json(&entries)?;
    } else {
        for entry in &entries {
            match (&entry.price, &entry.error) {
                (Some(price), _) => println!("{:>4}  {price}", entry.index),
                (None, Some(error)) => println!("{:>4}  error: {error}", entry.index),
                (None, None) => {}
            }
        }
    }

    Ok(entries)
}

// =============================================================================
// VALIDATE
// =============================================================================

/// Validate a sell form file and estimate the device on success.
pub fn cmd_validate(
    engine: &ValuationEngine,
    path: &Path,
    reference_year: i64,
    json: bool,
) -> Result<Valuation, CliError> {
    let form: SellForm = read_json(path)?;

    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(errors) => {
            if json {
                print_json(&errors)?;
            } else {
                for error in &errors.errors {
                    println!("{error}");
                }
            }
            return Err(errors.into());
        }
    };

    info!(
        model = %validated.model,
        delivery = ?validated.delivery_method,
        "sell form valid"
    );
    cmd_estimate(engine, &validated.device, reference_year, false, false, json)
}

// =============================================================================
// REVIEW
// =============================================================================

/// A ledger operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCommand {
    Approve(RequestId),
    Reject(RequestId),
    Adjust(RequestId, Price),
    Accept(RequestId),
    Decline(RequestId),
    Sold(RequestId),
    Summary,
}

impl LedgerCommand {
    /// Build a command from its name and optional arguments.
    pub fn parse(action: &str, id: Option<u64>, price: Option<&str>) -> Result<Self, CliError> {
        if action == "summary" {
            return Ok(Self::Summary);
        }
        let id = id
            .map(RequestId)
            .ok_or_else(|| CliError::InvalidArgument(format!("'{action}' needs --id")))?;
        match action {
            "approve" => Ok(Self::Approve(id)),
            "reject" => Ok(Self::Reject(id)),
            "accept" => Ok(Self::Accept(id)),
            "decline" => Ok(Self::Decline(id)),
            "sold" => Ok(Self::Sold(id)),
            "adjust" => {
                let price = price
                    .ok_or_else(|| CliError::InvalidArgument("'adjust' needs --price".into()))?;
                Ok(Self::Adjust(id, price.parse()?))
            }
            other => Err(CliError::InvalidArgument(format!(
                "unknown review action '{other}'"
            ))),
        }
    }
}

/// What `review` produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReviewOutcome {
    Ledger(Vec<TradeInRequest>),
    Summary(LedgerSummary),
}

/// Apply one ledger operation to a JSON array of requests and print the
/// result. The input file is not modified.
pub fn cmd_review(
    path: &Path,
    command: LedgerCommand,
    json: bool,
) -> Result<ReviewOutcome, CliError> {
    let requests: Vec<TradeInRequest> = read_json(path)?;
    let mut ledger = RequestLedger::from_requests(requests)?;

    let updated = match command {
        LedgerCommand::Summary => {
            let summary = ledger.summary();
            if json {
                print_json(&summary)?;
            } else {
                println!("total: {}", summary.total);
                for (status, count) in &summary.by_status {
                    println!("  {status}: {count}");
                }
                println!("committed: {}", summary.committed_value);
            }
            return Ok(ReviewOutcome::Summary(summary));
        }
        LedgerCommand::Approve(id) => ledger.approve(id)?,
        LedgerCommand::Reject(id) => ledger.reject(id)?,
        LedgerCommand::Adjust(id, price) => ledger.adjust_price(id, price)?,
        LedgerCommand::Accept(id) => ledger.accept_offer(id)?,
        LedgerCommand::Decline(id) => ledger.decline_offer(id)?,
        LedgerCommand::Sold(id) => ledger.mark_sold(id)?,
    };
    info!(
        id = %updated.id,
        status = %updated.status,
        price = %updated.estimated_price,
        "request updated"
    );

    let requests: Vec<TradeInRequest> = ledger.requests().cloned().collect();
    if json {
        print_json(&requests)?;
    } else {
        for request in &requests {
            println!(
                "{:<4} {:<20} {} {} ({})  {}  {}",
                request.id.to_string(),
                request.customer.name,
                request.device.brand,
                request.device.model,
                request.device.storage,
                request.estimated_price,
                request.status
            );
        }
    }

    Ok(ReviewOutcome::Ledger(requests))
}
