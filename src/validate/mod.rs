//! Input and output contract validation.
//!
//! The input check runs before any fitting computation is attempted, so
//! malformed feed rows cannot waste a batch; it reports *every* violating
//! row, not just the first. The same discipline applies symmetrically to the
//! assembled output table before it is staged for commit. Both checks are
//! pure.

use std::collections::HashSet;

use crate::domain::{LogitInputRow, TermTrendResult};
use crate::error::AppError;

/// Verify the fitting-input contract: non-empty terms, non-negative counts
/// and elapsed times.
pub fn check_logit_inputs(rows: &[LogitInputRow]) -> Result<(), AppError> {
    let mut violations = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if row.headline_term.is_empty() {
            violations.push(format!("row {i}: empty headline_term"));
        }
        if row.successes < 0 {
            violations.push(format!("row {i}: negative successes ({})", row.successes));
        }
        if row.failures < 0 {
            violations.push(format!("row {i}: negative failures ({})", row.failures));
        }
        if row.cum_time_elapsed < 0 {
            violations.push(format!(
                "row {i}: negative cum_time_elapsed ({})",
                row.cum_time_elapsed
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            3,
            format!(
                "Fitting input failed contract validation: {}",
                violations.join("; ")
            ),
        ))
    }
}

/// Verify the result-table contract: every term unique, statistics on fitted
/// rows finite and present as a complete set.
pub fn check_results(results: &[TermTrendResult]) -> Result<(), AppError> {
    let mut violations = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (i, r) in results.iter().enumerate() {
        if !seen.insert(r.headline_term.as_str()) {
            violations.push(format!("row {i}: duplicate headline_term '{}'", r.headline_term));
        }

        let stats = [r.coef_intercept, r.coef_time, r.rse_time, r.p_value_time];
        let present = stats.iter().filter(|s| s.is_some()).count();
        if present != 0 && present != stats.len() {
            violations.push(format!(
                "row {i}: term '{}' has a partial statistic set",
                r.headline_term
            ));
        }
        for (value, name) in stats.iter().zip(["coef_intercept", "coef_time", "rse_time", "p_value_time"]) {
            if let Some(v) = value {
                if !v.is_finite() {
                    violations.push(format!("row {i}: non-finite {name} ({v})"));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            4,
            format!(
                "Result table failed contract validation: {}",
                violations.join("; ")
            ),
        ))
    }
}
