//! # buyback
//!
//! Command-line front end for the device trade-in Valuation Engine.

use buyback::cli::{self, CliError, LedgerCommand};
use buyback::config::{AppConfig, DEFAULT_LOG_FILTER};
use buyback_core::{Condition, DeviceDescription, DeviceType, ValuationEngine};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "buyback", version, about = "Estimate trade-in prices for devices")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Match brands case-insensitively and accept checklist defect labels
    #[arg(long, global = true)]
    normalize: bool,

    /// Year to measure device age against (default: current year)
    #[arg(long, global = true)]
    reference_year: Option<i64>,

    /// tracing filter, e.g. "debug" or "buyback=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the price of one device
    Estimate {
        /// smartphone, laptop or tablet
        #[arg(long)]
        device_type: String,
        #[arg(long)]
        brand: String,
        /// Capacity with unit, e.g. 128GB
        #[arg(long)]
        storage: String,
        /// Year of purchase, e.g. 2022
        #[arg(long)]
        year: String,
        /// new, used or damaged
        #[arg(long)]
        condition: String,
        /// Reported defect (repeatable)
        #[arg(long = "defect")]
        defects: Vec<String>,
        /// Reject malformed input instead of pricing it with defaults
        #[arg(long)]
        strict: bool,
        /// Show every adjustment
        #[arg(long)]
        breakdown: bool,
    },

    /// Estimate every device in a JSON array file
    Batch {
        file: PathBuf,
        #[arg(long)]
        strict: bool,
    },

    /// Validate a sell form JSON file and estimate it
    Validate { file: PathBuf },

    /// Apply a review action to a JSON array of trade-in requests
    Review {
        file: PathBuf,
        #[arg(value_enum)]
        action: ReviewActionArg,
        /// Request id
        #[arg(long)]
        id: Option<u64>,
        /// New offer for `adjust`, e.g. 430 or 430.50
        #[arg(long)]
        price: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReviewActionArg {
    Approve,
    Reject,
    Adjust,
    Accept,
    Decline,
    Sold,
    Summary,
}

impl ReviewActionArg {
    fn name(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Adjust => "adjust",
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Sold => "sold",
            Self::Summary => "summary",
        }
    }
}

fn init_tracing(config: &AppConfig, flag: Option<&str>) {
    let filter = match flag {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.log_level.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config =
        AppConfig::load(cli.config.as_deref())?.with_overrides(cli.normalize, cli.reference_year);
    init_tracing(&config, cli.log_level.as_deref());

    let engine = ValuationEngine::new(config.policy);
    let reference_year = config.reference_year();
    tracing::debug!(?config, reference_year, "configuration resolved");

    match cli.command {
        Command::Estimate {
            device_type,
            brand,
            storage,
            year,
            condition,
            defects,
            strict,
            breakdown,
        } => {
            let mut device = DeviceDescription::new(
                DeviceType::parse(&device_type),
                brand,
                storage,
                year,
                Condition::parse(&condition),
            );
            device.defects = defects;
            cli::cmd_estimate(&engine, &device, reference_year, strict, breakdown, cli.json)?;
        }
        Command::Batch { file, strict } => {
            cli::cmd_batch(&engine, &file, reference_year, strict, cli.json)?;
        }
        Command::Validate { file } => {
            cli::cmd_validate(&engine, &file, reference_year, cli.json)?;
        }
        Command::Review {
            file,
            action,
            id,
            price,
        } => {
            let command = LedgerCommand::parse(action.name(), id, price.as_deref())?;
            cli::cmd_review(&file, command, cli.json)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
