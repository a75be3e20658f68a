//! Fitting-input CSV ingest.
//!
//! The offline `fit` subcommand (and the `sample` generator's output)
//! carries the same row shape as the warehouse feed, as a comma-delimited
//! file with header: `publication, headline_term, cum_time_elapsed,
//! successes, failures`. Contract validation is a separate, explicit step —
//! this module only parses.

use std::fs::File;
use std::path::Path;

use crate::domain::LogitInputRow;
use crate::error::AppError;

pub fn read_logit_inputs_csv(path: &Path) -> Result<Vec<LogitInputRow>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open input CSV '{}': {e}", path.display()),
        )
    })?;

    csv::Reader::from_reader(file)
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            AppError::new(
                2,
                format!("Failed to parse input CSV '{}': {e}", path.display()),
            )
        })
}

pub fn write_logit_inputs_csv(path: &Path, rows: &[LogitInputRow]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create input CSV '{}': {e}", path.display()),
        )
    })?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write input row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush input CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PUBLICATION;

    #[test]
    fn input_rows_round_trip() {
        let rows = vec![
            LogitInputRow {
                publication: PUBLICATION.to_string(),
                headline_term: "election".to_string(),
                cum_time_elapsed: 0,
                successes: 5,
                failures: 10,
            },
            LogitInputRow {
                publication: PUBLICATION.to_string(),
                headline_term: "weather".to_string(),
                cum_time_elapsed: 30,
                successes: 1,
                failures: 1,
            },
        ];

        let path = std::env::temp_dir().join(format!("ht-ingest-test-{}.csv", std::process::id()));
        write_logit_inputs_csv(&path, &rows).unwrap();
        let read_back = read_logit_inputs_csv(&path).unwrap();
        assert_eq!(read_back, rows);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_input_file_is_a_config_error() {
        let err = read_logit_inputs_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
