//! Bulk result committer.
//!
//! Replays a staged result artifact into `model_output` through one prepared
//! statement — the embedded-store analogue of a `COPY FROM` bulk path, and
//! still a single set-oriented pass rather than ad-hoc per-row SQL.
//!
//! The staged artifact is never deleted here. Removing it after a successful
//! commit is the pipeline's job; on failure the enclosing transaction rolls
//! back and the artifact stays on disk so the run can be retried or
//! inspected without recomputation.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::AppError;

/// Load a staged result file into `model_output` in one pass.
///
/// Runs on the caller's open transaction; returns the number of rows loaded.
pub fn bulk_load(conn: &Connection, staged_path: &Path) -> Result<usize, AppError> {
    let results = crate::io::stage::read_staged(staged_path)?;

    let mut stmt = conn
        .prepare(
            "INSERT INTO model_output
             (headline_term, coef_intercept, coef_time, rse_time, p_value_time, model_run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|e| AppError::db(format!("Failed to prepare bulk load: {e}")))?;

    for r in &results {
        stmt.execute(params![
            r.headline_term,
            r.coef_intercept,
            r.coef_time,
            r.rse_time,
            r.p_value_time,
            r.model_run_id
        ])
        .map_err(|e| {
            AppError::db(format!(
                "Failed to bulk-load staged results from '{}': {e}",
                staged_path.display()
            ))
        })?;
    }

    Ok(results.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TermTrendResult, Window};
    use crate::io::stage;
    use crate::store::Session;
    use chrono::NaiveDate;

    fn temp_staging() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ht-commit-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn results(run_id: i64) -> Vec<TermTrendResult> {
        vec![
            TermTrendResult {
                headline_term: "election".to_string(),
                coef_intercept: Some(-0.9),
                coef_time: Some(0.09),
                rse_time: Some(0.4),
                p_value_time: Some(0.01),
                model_run_id: run_id,
            },
            TermTrendResult {
                headline_term: "weather".to_string(),
                coef_intercept: None,
                coef_time: None,
                rse_time: None,
                p_value_time: None,
                model_run_id: run_id,
            },
        ]
    }

    #[test]
    fn staged_rows_round_trip_through_the_bulk_path() {
        let session = Session::open_in_memory().unwrap();
        let window = Window::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();

        let run_id = crate::store::ledger::reserve_run(session.conn(), &window)
            .unwrap()
            .run_id;
        let staged = stage::staged_path(&temp_staging(), &window);
        stage::write_staged(&staged, &results(run_id)).unwrap();

        let loaded = bulk_load(session.conn(), &staged).unwrap();
        assert_eq!(loaded, 2);

        let coef: Option<f64> = session
            .conn()
            .query_row(
                "SELECT coef_time FROM model_output WHERE headline_term = 'weather'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(coef, None);

        let coef: Option<f64> = session
            .conn()
            .query_row(
                "SELECT coef_time FROM model_output WHERE headline_term = 'election'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(coef.unwrap() > 0.0);

        std::fs::remove_file(staged).ok();
    }

    #[test]
    fn missing_staged_artifact_is_an_error() {
        let session = Session::open_in_memory().unwrap();
        let missing = temp_staging().join("does-not-exist.csv");
        assert!(bulk_load(session.conn(), &missing).is_err());
    }
}
