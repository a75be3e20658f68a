//! The fitting-input feed.
//!
//! The upstream transformation layer materializes daily per-term trial
//! counts into `fct_logit_inputs`; this module pulls the slice for one
//! window, applying the feed contract: terms below the aggregate frequency
//! threshold and the empty-string term are excluded, and elapsed time is
//! measured in whole days from the window start.

use rusqlite::{Connection, params};

use crate::domain::{LogitInputRow, Window};
use crate::error::AppError;

/// Minimum aggregate in-window occurrence count for a term to be fitted.
pub const MIN_TERM_FREQUENCY: i64 = 50;

pub fn fetch_logit_inputs(
    conn: &Connection,
    window: &Window,
    min_term_frequency: i64,
) -> Result<Vec<LogitInputRow>, AppError> {
    let mut stmt = conn
        .prepare(
            "SELECT publication,
                    headline_term,
                    CAST(julianday(publication_date) - julianday(?1) AS INTEGER),
                    successes,
                    failures
             FROM fct_logit_inputs
             WHERE headline_term_frequency >= ?2
               AND headline_term != ''
               AND publication_date BETWEEN ?1 AND ?3",
        )
        .map_err(|e| AppError::db(format!("Failed to prepare input feed query: {e}")))?;

    let rows = stmt
        .query_map(
            params![
                window.start.to_string(),
                min_term_frequency,
                window.end.to_string()
            ],
            |r| {
                Ok(LogitInputRow {
                    publication: r.get(0)?,
                    headline_term: r.get(1)?,
                    cum_time_elapsed: r.get(2)?,
                    successes: r.get(3)?,
                    failures: r.get(4)?,
                })
            },
        )
        .map_err(|e| AppError::db(format!("Failed to query input feed: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::db(format!("Failed to read input feed rows: {e}")))?;

    Ok(rows)
}
