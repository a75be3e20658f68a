//! Warehouse access: session, schema bootstrap, run ledger, input feed, and
//! the bulk result committer.
//!
//! All database work for one run flows through a single [`Session`] so the
//! reservation and the eventual result commit share one transaction. There is
//! deliberately no shared module-level connection: the session is passed into
//! each component and released on every exit path.

use std::path::Path;

use rusqlite::Connection;

use crate::error::AppError;

pub mod commit;
pub mod inputs;
pub mod ledger;

/// Owns the database connection for the duration of one run.
pub struct Session {
    conn: Connection,
}

impl Session {
    /// Open (or create) the warehouse at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path).map_err(|e| {
            AppError::db(format!(
                "Failed to open warehouse '{}': {e}",
                path.display()
            ))
        })?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory warehouse, for tests and experiments.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::db(format!("Failed to open in-memory warehouse: {e}")))?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within one transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| AppError::db(format!("Failed to begin transaction: {e}")))?;
        match f(&self.conn) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|e| AppError::db(format!("Failed to commit transaction: {e}")))?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

/// Create the run ledger, result, and input feed tables if absent.
///
/// The UNIQUE constraint on the window bounds is the schema half of the
/// at-most-one-run-per-window invariant; ledger logic alone cannot stop two
/// concurrent reservations.
pub fn ensure_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS model_run (
            model_run_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            publication   TEXT NOT NULL,
            window_start  TEXT NOT NULL,
            window_end    TEXT NOT NULL,
            UNIQUE (window_start, window_end)
        );
        CREATE TABLE IF NOT EXISTS model_output (
            headline_term  TEXT NOT NULL,
            coef_intercept REAL,
            coef_time      REAL,
            rse_time       REAL,
            p_value_time   REAL,
            model_run_id   INTEGER NOT NULL REFERENCES model_run (model_run_id),
            UNIQUE (model_run_id, headline_term)
        );
        CREATE TABLE IF NOT EXISTS fct_logit_inputs (
            publication             TEXT NOT NULL,
            headline_term           TEXT NOT NULL,
            publication_date        TEXT NOT NULL,
            successes               INTEGER NOT NULL,
            failures                INTEGER NOT NULL,
            headline_term_frequency INTEGER NOT NULL
        );",
    )
    .map_err(|e| AppError::db(format!("Failed to apply warehouse schema: {e}")))
}
