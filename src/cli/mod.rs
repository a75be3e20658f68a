//! Command-line parsing for the headline trend fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/persistence code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ht", version, about = "Headline term trend model runs (logistic growth)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute one idempotent model run against the warehouse.
    ///
    /// Consults the run ledger first: if a run already exists for the exact
    /// window, nothing is fitted and nothing is written.
    Run(RunArgs),
    /// Fit a batch from a local input CSV and print rankings (no warehouse).
    Fit(FitArgs),
    /// Generate a synthetic fitting-input CSV.
    Sample(SampleArgs),
}

/// Options for a warehouse-backed model run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Warehouse database path (falls back to the HT_DB environment variable).
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Staging directory for bulk-load artifacts (falls back to HT_STAGING,
    /// then ./staging).
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Window start date (YYYY-MM-DD).
    #[arg(long)]
    pub window_start: NaiveDate,

    /// Window end date (YYYY-MM-DD).
    #[arg(long)]
    pub window_end: NaiveDate,

    /// Minimum aggregate in-window frequency for a term to be fitted.
    #[arg(long, default_value_t = crate::store::inputs::MIN_TERM_FREQUENCY)]
    pub min_term_frequency: i64,
}

/// Options for offline fitting from a CSV.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV with columns: publication, headline_term, cum_time_elapsed,
    /// successes, failures.
    #[arg(long)]
    pub input: PathBuf,

    /// Show top-N rising and declining terms.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long)]
    pub out: PathBuf,

    /// Number of synthetic terms.
    #[arg(long, default_value_t = 25)]
    pub terms: usize,

    /// Number of elapsed days covered.
    #[arg(long, default_value_t = 180)]
    pub days: i64,

    /// Bernoulli trials per term per day.
    #[arg(long, default_value_t = 40)]
    pub trials: u64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
