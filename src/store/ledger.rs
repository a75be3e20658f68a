//! The run ledger: the idempotency boundary of the whole system.
//!
//! Given a window, either report the existing run (the caller skips fitting
//! and committing entirely) or reserve a new run id. Both operations run on
//! the caller's open transaction, so a crash or failure between reservation
//! and commit leaves no orphaned run row behind.

use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{ModelRun, PUBLICATION, Window};
use crate::error::AppError;

/// Look up an existing run for exactly this window.
pub fn find_run(conn: &Connection, window: &Window) -> Result<Option<i64>, AppError> {
    conn.query_row(
        "SELECT model_run_id FROM model_run WHERE window_start = ?1 AND window_end = ?2",
        params![window.start.to_string(), window.end.to_string()],
        |r| r.get(0),
    )
    .optional()
    .map_err(|e| AppError::db(format!("Failed to query run ledger: {e}")))
}

/// Reserve a new run for this window.
///
/// Two concurrent reservations for the same window both pass the not-found
/// check; the UNIQUE constraint on `(window_start, window_end)` makes the
/// second insert fail instead of violating the at-most-one-run invariant.
pub fn reserve_run(conn: &Connection, window: &Window) -> Result<ModelRun, AppError> {
    conn.execute(
        "INSERT INTO model_run (publication, window_start, window_end) VALUES (?1, ?2, ?3)",
        params![
            PUBLICATION,
            window.start.to_string(),
            window.end.to_string()
        ],
    )
    .map_err(|e| AppError::db(format!("Failed to reserve model run for {window}: {e}")))?;

    Ok(ModelRun {
        run_id: conn.last_insert_rowid(),
        publication: PUBLICATION.to_string(),
        window: *window,
    })
}
