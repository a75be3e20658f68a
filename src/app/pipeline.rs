//! The model run flow shared by every front-end.
//!
//! Control flow, in one enclosing transaction:
//!
//! ledger consult -> reserve -> feed pull -> validate -> batch fit ->
//! stage -> bulk load -> commit
//!
//! The transaction makes the run reservation and its results visible
//! together or not at all: any fatal failure after reservation rolls both
//! back, and a staged artifact written before the failure is retained for
//! retry or inspection.

use std::fs;

use log::{info, warn};

use crate::domain::RunConfig;
use crate::error::AppError;
use crate::fit::batch::{assemble_results, fit_batch};
use crate::io::stage;
use crate::store::{Session, commit, inputs, ledger};

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A run for this exact window already exists. Nothing was fitted or
    /// written, and the input feed was not touched.
    AlreadyComplete { run_id: i64 },
    /// A new run was reserved, fitted, and committed.
    Completed {
        run_id: i64,
        terms: usize,
        fitted: usize,
    },
}

enum TxOutcome {
    AlreadyComplete {
        run_id: i64,
    },
    Committed {
        run_id: i64,
        terms: usize,
        fitted: usize,
        staged: std::path::PathBuf,
    },
}

/// Execute one idempotent model run.
pub fn run_model(config: &RunConfig) -> Result<RunOutcome, AppError> {
    info!("Opening warehouse session @ '{}'", config.db_path.display());
    let session = Session::open(&config.db_path)?;

    info!(
        "Checking for pre-existing output for time horizon: {}",
        config.window
    );
    let outcome = session.with_transaction(|conn| {
        if let Some(run_id) = ledger::find_run(conn, &config.window)? {
            return Ok(TxOutcome::AlreadyComplete { run_id });
        }

        let run_id = ledger::reserve_run(conn, &config.window)?.run_id;
        info!(
            "Commencing model run {run_id} for time horizon: {}",
            config.window
        );

        let rows = inputs::fetch_logit_inputs(conn, &config.window, config.min_term_frequency)?;
        if rows.is_empty() {
            return Err(AppError::new(
                3,
                format!("No fitting input rows for time horizon: {}", config.window),
            ));
        }
        crate::validate::check_logit_inputs(&rows)?;

        info!(
            "Modelling logistic growth across each resident term ({} input rows)",
            rows.len()
        );
        let fits = fit_batch(&rows);
        let results = assemble_results(&fits, run_id)?;
        let fitted = results.iter().filter(|r| r.is_fitted()).count();

        let staged = stage::staged_path(&config.staging_dir, &config.window);
        info!("Dumping model results @ '{}'", staged.display());
        stage::write_staged(&staged, &results)?;

        info!("Bulk-loading staged results into the warehouse");
        commit::bulk_load(conn, &staged)?;

        Ok(TxOutcome::Committed {
            run_id,
            terms: results.len(),
            fitted,
            staged,
        })
    })?;

    match outcome {
        TxOutcome::AlreadyComplete { run_id } => Ok(RunOutcome::AlreadyComplete { run_id }),
        TxOutcome::Committed {
            run_id,
            terms,
            fitted,
            staged,
        } => {
            // The commit made the results durable; the staged artifact has
            // served its purpose. Failing to remove it does not fail the run.
            if let Err(e) = fs::remove_file(&staged) {
                warn!("Failed to remove staged artifact '{}': {e}", staged.display());
            }
            Ok(RunOutcome::Completed {
                run_id,
                terms,
                fitted,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::NaiveDate;
    use rusqlite::params;

    use crate::domain::Window;

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    /// Fresh on-disk warehouse + staging dir per test.
    fn test_config() -> RunConfig {
        let seq = DIR_SEQ.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "ht-pipeline-test-{}-{seq}",
            std::process::id()
        ));
        fs::create_dir_all(&root).unwrap();

        RunConfig {
            db_path: root.join("warehouse.db"),
            staging_dir: root.clone(),
            window: Window::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            )
            .unwrap(),
            min_term_frequency: 50,
        }
    }

    fn seed_feed_row(session: &Session, term: &str, date: &str, s: i64, f: i64) {
        session
            .conn()
            .execute(
                "INSERT INTO fct_logit_inputs
                 (publication, headline_term, publication_date, successes, failures, headline_term_frequency)
                 VALUES ('New York Times', ?1, ?2, ?3, ?4, 60)",
                params![term, date, s, f],
            )
            .unwrap();
    }

    /// The two-term scenario: a rising term that fits and a single-bucket
    /// term that cannot.
    fn seed_example_feed(config: &RunConfig) {
        let session = Session::open(&config.db_path).unwrap();
        seed_feed_row(&session, "election", "2024-01-01", 5, 10);
        seed_feed_row(&session, "election", "2024-01-31", 40, 5);
        seed_feed_row(&session, "weather", "2024-01-01", 1, 1);
    }

    fn count(config: &RunConfig, sql: &str) -> i64 {
        let session = Session::open(&config.db_path).unwrap();
        let n = session.conn().query_row(sql, [], |r| r.get(0)).unwrap();
        n
    }

    #[test]
    fn completed_run_commits_one_run_and_a_row_per_term() {
        let config = test_config();
        seed_example_feed(&config);

        let outcome = run_model(&config).unwrap();
        let RunOutcome::Completed {
            terms, fitted, ..
        } = outcome
        else {
            panic!("expected a completed run");
        };
        assert_eq!(terms, 2);
        assert_eq!(fitted, 1);

        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_run"), 1);
        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_output"), 2);

        // The rising term fits with a positive trend.
        let session = Session::open(&config.db_path).unwrap();
        let coef: Option<f64> = session
            .conn()
            .query_row(
                "SELECT coef_time FROM model_output WHERE headline_term = 'election'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(coef.unwrap() > 0.0);

        // The single-bucket term is null-marked, not dropped.
        let coef: Option<f64> = session
            .conn()
            .query_row(
                "SELECT coef_time FROM model_output WHERE headline_term = 'weather'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(coef, None);

        // The staged artifact was removed after the commit.
        assert!(!stage::staged_path(&config.staging_dir, &config.window).exists());
    }

    #[test]
    fn second_run_short_circuits_without_touching_the_feed() {
        let config = test_config();
        seed_example_feed(&config);

        let first = run_model(&config).unwrap();
        let RunOutcome::Completed { run_id, .. } = first else {
            panic!("expected a completed run");
        };

        // Emptying the feed proves the second invocation never reads fitting
        // input: a non-short-circuited run would abort on the empty feed.
        {
            let session = Session::open(&config.db_path).unwrap();
            session
                .conn()
                .execute_batch("DELETE FROM fct_logit_inputs")
                .unwrap();
        }

        let second = run_model(&config).unwrap();
        assert_eq!(second, RunOutcome::AlreadyComplete { run_id });

        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_run"), 1);
        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_output"), 2);
    }

    #[test]
    fn commit_failure_rolls_back_the_reservation_and_keeps_the_artifact() {
        let config = test_config();
        seed_example_feed(&config);

        // Sabotage the destination table: the bulk load fails after the
        // batch has been fitted and staged.
        {
            let session = Session::open(&config.db_path).unwrap();
            session
                .conn()
                .execute_batch(
                    "CREATE TRIGGER reject_output BEFORE INSERT ON model_output
                     BEGIN SELECT RAISE(ABORT, 'forced load failure'); END;",
                )
                .unwrap();
        }

        let err = run_model(&config).unwrap_err();
        assert_eq!(err.exit_code(), 5);

        // Rollback undid the reservation...
        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_run"), 0);
        // ...and the staged artifact is preserved for retry.
        assert!(stage::staged_path(&config.staging_dir, &config.window).exists());
    }

    #[test]
    fn negative_counts_are_rejected_before_any_fit_or_stage() {
        let config = test_config();
        {
            let session = Session::open(&config.db_path).unwrap();
            seed_feed_row(&session, "election", "2024-01-01", -5, 10);
            seed_feed_row(&session, "election", "2024-01-31", 40, 5);
        }

        let err = run_model(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("negative successes"));

        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_run"), 0);
        assert!(!stage::staged_path(&config.staging_dir, &config.window).exists());
    }

    #[test]
    fn empty_feed_aborts_and_leaves_no_reservation() {
        let config = test_config();
        // Warehouse exists but the feed has nothing in-window.
        Session::open(&config.db_path).unwrap();

        let err = run_model(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(count(&config, "SELECT COUNT(*) FROM model_run"), 0);
    }
}
