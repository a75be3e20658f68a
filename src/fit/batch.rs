//! Batch trend orchestration.
//!
//! Drives [`fit_term`](crate::fit::glm::fit_term) across every distinct
//! `headline_term` in the validated input and assembles one combined result
//! table. A single term's numerical failure never aborts the batch: the term
//! is logged and carried through as a null-marked row, so the set of output
//! terms always equals the set of distinct input terms.

use std::collections::BTreeMap;

use log::warn;
use rayon::prelude::*;

use crate::domain::{LogitInputRow, TermFit, TermTrendResult};
use crate::error::AppError;
use crate::fit::glm::fit_term;

/// Fit every distinct term present in `rows`.
///
/// Terms are disjoint, so the batch runs on the rayon pool; ordering between
/// terms is not observable, and the returned vector is sorted by term only to
/// keep staged artifacts deterministic.
pub fn fit_batch(rows: &[LogitInputRow]) -> Vec<TermFit> {
    let mut by_term: BTreeMap<String, Vec<LogitInputRow>> = BTreeMap::new();
    for row in rows {
        by_term
            .entry(row.headline_term.clone())
            .or_default()
            .push(row.clone());
    }

    let groups: Vec<(String, Vec<LogitInputRow>)> = by_term.into_iter().collect();

    groups
        .par_iter()
        .map(|(term, term_rows)| match fit_term(term_rows) {
            Ok(fit) => TermFit {
                headline_term: term.clone(),
                fit: Some(fit),
            },
            Err(failure) => {
                warn!("Erroneous fit for term '{term}' ({failure}); null-marking output.");
                TermFit {
                    headline_term: term.clone(),
                    fit: None,
                }
            }
        })
        .collect()
}

/// Attach the reserved run id to every term outcome and enforce the output
/// contract before anything is staged or committed.
pub fn assemble_results(fits: &[TermFit], run_id: i64) -> Result<Vec<TermTrendResult>, AppError> {
    let results: Vec<TermTrendResult> = fits
        .iter()
        .map(|tf| TermTrendResult::from_term_fit(tf, run_id))
        .collect();
    crate::validate::check_results(&results)?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PUBLICATION;

    fn row(term: &str, t: i64, s: i64, f: i64) -> LogitInputRow {
        LogitInputRow {
            publication: PUBLICATION.to_string(),
            headline_term: term.to_string(),
            cum_time_elapsed: t,
            successes: s,
            failures: f,
        }
    }

    fn trending_rows(term: &str) -> Vec<LogitInputRow> {
        (0..10).map(|t| row(term, t * 7, 5 + t * 4, 40)).collect()
    }

    #[test]
    fn output_terms_exactly_match_input_terms() {
        let mut rows = trending_rows("election");
        rows.extend(trending_rows("inflation"));
        // Single bucket: expected to fail to fit, but must not disappear.
        rows.push(row("weather", 0, 1, 1));

        let fits = fit_batch(&rows);

        let terms: Vec<&str> = fits.iter().map(|f| f.headline_term.as_str()).collect();
        assert_eq!(terms, vec!["election", "inflation", "weather"]);
        assert!(fits[0].fit.is_some());
        assert!(fits[1].fit.is_some());
        assert!(fits[2].fit.is_none());
    }

    #[test]
    fn failed_term_is_null_marked_not_dropped() {
        let mut rows = trending_rows("election");
        rows.push(row("weather", 0, 1, 1));

        let fits = fit_batch(&rows);
        let results = assemble_results(&fits, 3).unwrap();

        assert_eq!(results.len(), 2);
        let weather = results.iter().find(|r| r.headline_term == "weather").unwrap();
        assert!(!weather.is_fitted());
        assert_eq!(weather.model_run_id, 3);
    }

    #[test]
    fn run_id_is_attached_to_every_row() {
        let rows = trending_rows("election");
        let fits = fit_batch(&rows);
        let results = assemble_results(&fits, 42).unwrap();
        assert!(results.iter().all(|r| r.model_run_id == 42));
    }

    #[test]
    fn rising_term_fits_with_positive_time_coefficient() {
        let fits = fit_batch(&trending_rows("election"));
        let fit = fits[0].fit.expect("trend fit");
        assert!(fit.coef_time > 0.0);
    }
}
