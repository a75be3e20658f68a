//! Staged result artifacts.
//!
//! Before the bulk load, the validated result table is written to durable
//! local storage: pipe-delimited, header included, named deterministically
//! from the window bounds. A run that fails during commit leaves the
//! artifact in place so it can be retried or inspected without refitting.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::{TermTrendResult, Window};
use crate::error::AppError;

/// Deterministic staged-artifact location for a window.
pub fn staged_path(staging_dir: &Path, window: &Window) -> PathBuf {
    staging_dir.join(format!("{}_logit_out.csv", window.label()))
}

/// Write the result table. Null-marked statistics serialize as empty fields.
pub fn write_staged(path: &Path, results: &[TermTrendResult]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create staged artifact '{}': {e}", path.display()),
        )
    })?;

    let mut writer = csv::WriterBuilder::new().delimiter(b'|').from_writer(file);
    for r in results {
        writer
            .serialize(r)
            .map_err(|e| AppError::new(2, format!("Failed to write staged row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush staged artifact: {e}")))
}

/// Read a staged artifact back for the bulk-load pass.
pub fn read_staged(path: &Path) -> Result<Vec<TermTrendResult>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open staged artifact '{}': {e}", path.display()),
        )
    })?;

    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .from_reader(file)
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            AppError::new(
                2,
                format!("Failed to parse staged artifact '{}': {e}", path.display()),
            )
        })
}
