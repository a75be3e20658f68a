//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads environment configuration and initializes logging
//! - parses CLI arguments
//! - resolves run configuration (flags plus env fallbacks)
//! - dispatches to the model run pipeline, offline fitting, or sample
//!   generation

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::cli::{Command, FitArgs, RunArgs, SampleArgs};
use crate::data::SampleConfig;
use crate::domain::{RunConfig, Window};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ht` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .ok();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Fit(args) => handle_fit(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let db_path = args
        .db
        .or_else(|| std::env::var_os("HT_DB").map(PathBuf::from))
        .ok_or_else(|| AppError::new(2, "No warehouse path: pass --db or set HT_DB."))?;

    let staging_dir = args
        .staging_dir
        .or_else(|| std::env::var_os("HT_STAGING").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("staging"));
    std::fs::create_dir_all(&staging_dir).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Failed to create staging directory '{}': {e}",
                staging_dir.display()
            ),
        )
    })?;

    let config = RunConfig {
        db_path,
        staging_dir,
        window: Window::new(args.window_start, args.window_end)?,
        min_term_frequency: args.min_term_frequency,
    };

    match pipeline::run_model(&config)? {
        pipeline::RunOutcome::AlreadyComplete { run_id } => {
            info!("Run already complete (model_run_id {run_id}); aborting!");
        }
        pipeline::RunOutcome::Completed {
            run_id,
            terms,
            fitted,
        } => {
            info!(
                "Committed model_run_id {run_id}: {terms} term(s), {fitted} fitted, {} null-marked",
                terms - fitted
            );
        }
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let rows = crate::io::ingest::read_logit_inputs_csv(&args.input)?;
    if rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No fitting input rows in '{}'.", args.input.display()),
        ));
    }
    crate::validate::check_logit_inputs(&rows)?;

    let fits = crate::fit::batch::fit_batch(&rows);
    let rankings = crate::report::rank_trends(&fits, args.top);

    print!("{}", crate::report::format_fit_table(&fits));
    print!("{}", crate::report::format_rankings(&rankings));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let rows = crate::data::generate_sample(&SampleConfig {
        terms: args.terms,
        days: args.days,
        trials_per_day: args.trials,
        seed: args.seed,
    })?;

    crate::io::ingest::write_logit_inputs_csv(&args.out, &rows)?;
    info!(
        "Wrote {} rows for {} synthetic term(s) to '{}'",
        rows.len(),
        args.terms,
        args.out.display()
    );
    Ok(())
}
