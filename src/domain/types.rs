//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - staged to delimited files for the bulk-load path
//! - reloaded later for inspection or retry

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Source publication for every run.
///
/// The engine currently measures a single publication; the column is carried
/// through the data model so additional sources can be onboarded without a
/// schema change.
pub const PUBLICATION: &str = "New York Times";

/// The date range over which trend input data is gathered for one run.
///
/// `(start, end)` is the natural key of a model run: the ledger guarantees at
/// most one committed run per exact pair. Overlapping-but-distinct windows are
/// deliberately *not* mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::new(
                2,
                format!("Window end '{end}' precedes window start '{start}'."),
            ));
        }
        Ok(Self { start, end })
    }

    /// Whole days elapsed from the window start to `date`.
    pub fn elapsed_days(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }

    /// Deterministic label used in staged-artifact file names.
    pub fn label(&self) -> String {
        format!("{}_{}", self.start, self.end)
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' - '{}'", self.start, self.end)
    }
}

/// A reserved (and eventually committed) model run.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub run_id: i64,
    pub publication: String,
    pub window: Window,
}

/// One fitting-input record: a term's trial counts for one elapsed-time bucket.
///
/// Counts are carried as `i64` even though the contract requires them to be
/// non-negative: the feed is collaborator-produced, and malformed values must
/// be *reported* by the validator rather than silently coerced at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogitInputRow {
    pub publication: String,
    pub headline_term: String,
    /// Days since the window start.
    pub cum_time_elapsed: i64,
    /// Occurrence trials that day.
    pub successes: i64,
    /// Non-occurrence trials that day.
    pub failures: i64,
}

/// Statistics of a successful per-term fit.
///
/// `logit(p_t) = coef_intercept + coef_time * t`; the sign of `coef_time`
/// is the trend (positive = rising prevalence, negative = declining).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub coef_intercept: f64,
    pub coef_time: f64,
    /// Relative standard error of the time coefficient:
    /// `std_error(coef_time) / |coef_time|`.
    pub rse_time: f64,
    /// Two-sided Wald significance of the time coefficient.
    pub p_value_time: f64,
}

/// Per-term outcome of the batch loop: a fit, or an explicit null marker.
#[derive(Debug, Clone)]
pub struct TermFit {
    pub headline_term: String,
    /// `None` when fitting was attempted but did not produce a usable
    /// statistic. Null-marked terms are carried through to the warehouse so
    /// downstream consumers can distinguish "not computed" from "never
    /// existed".
    pub fit: Option<TrendFit>,
}

/// One persisted result row, tagged with its run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermTrendResult {
    pub headline_term: String,
    pub coef_intercept: Option<f64>,
    pub coef_time: Option<f64>,
    pub rse_time: Option<f64>,
    pub p_value_time: Option<f64>,
    pub model_run_id: i64,
}

impl TermTrendResult {
    pub fn from_term_fit(term_fit: &TermFit, run_id: i64) -> Self {
        Self {
            headline_term: term_fit.headline_term.clone(),
            coef_intercept: term_fit.fit.map(|f| f.coef_intercept),
            coef_time: term_fit.fit.map(|f| f.coef_time),
            rse_time: term_fit.fit.map(|f| f.rse_time),
            p_value_time: term_fit.fit.map(|f| f.p_value_time),
            model_run_id: run_id,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.coef_time.is_some()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus environment defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub db_path: PathBuf,
    pub staging_dir: PathBuf,
    pub window: Window,
    /// Minimum aggregate in-window frequency for a term to enter the fit.
    pub min_term_frequency: i64,
}
