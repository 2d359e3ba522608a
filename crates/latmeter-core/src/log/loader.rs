use std::collections::HashMap;
use std::path::Path;

use crate::error::LatmeterError;
use crate::table::{LatencyTable, SessionRow};

/// Columns that must be present in the log header for analysis to proceed.
/// `run_started_at` and `label` are display-only and tolerated when absent.
const REQUIRED_COLUMNS: [&str; 7] = [
    "url",
    "attempts",
    "successes",
    "failures",
    "min_ms",
    "max_ms",
    "avg_ms",
];

/// Read the persistent log into a validated [`LatencyTable`].
///
/// Fails with a distinguishable error for each way the source can be bad:
/// missing file, empty file (or header with no rows), unparseable structure
/// or cell, or a required column absent from the header. Never returns a
/// partially populated table and never mutates the source.
pub fn load_table(path: impl AsRef<Path>) -> Result<LatencyTable, LatmeterError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LatmeterError::LogMissing(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(LatmeterError::LogEmpty(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LatmeterError::LogMalformed(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(LatmeterError::SchemaColumnMissing(required.to_string()));
        }
    }

    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let mut rows = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LatmeterError::LogMalformed(e.to_string()))?;
        rows.push(parse_row(&record, &index, row_num)?);
    }

    if rows.is_empty() {
        return Err(LatmeterError::LogEmpty(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "latency log loaded");
    Ok(LatencyTable::from_rows(rows))
}

impl LatencyTable {
    /// Load and validate the log at `path`. See [`load_table`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LatmeterError> {
        load_table(path)
    }
}

fn parse_row(
    record: &csv::StringRecord,
    index: &HashMap<&str, usize>,
    row_num: usize,
) -> Result<SessionRow, LatmeterError> {
    let cell = |column: &str| -> &str {
        index
            .get(column)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    };

    let int = |column: &str| -> Result<u32, LatmeterError> {
        cell(column).trim().parse::<u32>().map_err(|e| {
            LatmeterError::LogMalformed(format!("row {}, column {column}: {e}", row_num + 1))
        })
    };

    let float = |column: &str| -> Result<Option<f64>, LatmeterError> {
        let raw = cell(column).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>().map(Some).map_err(|e| {
            LatmeterError::LogMalformed(format!("row {}, column {column}: {e}", row_num + 1))
        })
    };

    Ok(SessionRow {
        run_started_at: cell("run_started_at").to_string(),
        label: cell("label").to_string(),
        url: cell("url").trim().to_string(),
        attempts: int("attempts")?,
        successes: int("successes")?,
        failures: int("failures")?,
        min_ms: float("min_ms")?,
        max_ms: float("max_ms")?,
        avg_ms: float("avg_ms")?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_log(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("results.csv");
        std::fs::write(&path, content).expect("log should be writable");
        (dir, path)
    }

    const HEADER: &str = "run_started_at,label,url,attempts,successes,failures,min_ms,max_ms,avg_ms";

    // -----------------------------------------------------------------------
    // error taxonomy
    // -----------------------------------------------------------------------

    #[test]
    fn nonexistent_path_is_a_missing_source_error() {
        let result = load_table("/nonexistent/dir/results.csv");
        assert!(matches!(result, Err(LatmeterError::LogMissing(_))));
    }

    #[test]
    fn zero_byte_file_is_an_empty_source_error() {
        let (_dir, path) = write_log("");
        let result = load_table(&path);
        assert!(matches!(result, Err(LatmeterError::LogEmpty(_))));
    }

    #[test]
    fn header_only_file_is_an_empty_source_error() {
        let (_dir, path) = write_log(&format!("{HEADER}\n"));
        let result = load_table(&path);
        assert!(matches!(result, Err(LatmeterError::LogEmpty(_))));
    }

    #[test]
    fn missing_avg_ms_column_is_a_schema_error_naming_it() {
        let (_dir, path) = write_log(
            "run_started_at,label,url,attempts,successes,failures,min_ms,max_ms\n\
             2026-08-01 10:00:00,Wifi,https://a.com,5,5,0,10,20\n",
        );
        match load_table(&path) {
            Err(LatmeterError::SchemaColumnMissing(col)) => assert_eq!(col, "avg_ms"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn missing_url_column_is_a_schema_error_naming_it() {
        let (_dir, path) = write_log(
            "run_started_at,label,attempts,successes,failures,min_ms,max_ms,avg_ms\n\
             2026-08-01 10:00:00,Wifi,5,5,0,10,20,15\n",
        );
        match load_table(&path) {
            Err(LatmeterError::SchemaColumnMissing(col)) => assert_eq!(col, "url"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_count_cell_is_a_malformed_source_error() {
        let (_dir, path) = write_log(&format!(
            "{HEADER}\n2026-08-01 10:00:00,Wifi,https://a.com,five,5,0,10,20,15\n"
        ));
        match load_table(&path) {
            Err(LatmeterError::LogMalformed(msg)) => assert!(msg.contains("attempts")),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_quote_is_a_malformed_source_error() {
        let (_dir, path) = write_log(&format!(
            "{HEADER}\n\"2026-08-01,Wifi,https://a.com,5,5,0,10,20,15\n"
        ));
        let result = load_table(&path);
        assert!(matches!(result, Err(LatmeterError::LogMalformed(_))));
    }

    // -----------------------------------------------------------------------
    // successful loads
    // -----------------------------------------------------------------------

    #[test]
    fn loads_rows_and_trims_urls() {
        let (_dir, path) = write_log(&format!(
            "{HEADER}\n2026-08-01 10:00:00,Wifi,  https://a.com  ,5,4,1,10.5,30.25,18.0\n"
        ));
        let table = load_table(&path).expect("load should succeed");
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.url, "https://a.com");
        assert_eq!(row.attempts, 5);
        assert_eq!(row.successes, 4);
        assert_eq!(row.failures, 1);
        assert_eq!(row.min_ms, Some(10.5));
        assert_eq!(row.max_ms, Some(30.25));
        assert_eq!(row.avg_ms, Some(18.0));
    }

    #[test]
    fn empty_latency_cells_load_as_none() {
        let (_dir, path) = write_log(&format!(
            "{HEADER}\n2026-08-01 10:00:00,Wifi,https://down.com,3,0,3,,,\n"
        ));
        let table = load_table(&path).expect("load should succeed");
        let row = &table.rows()[0];
        assert_eq!(row.successes, 0);
        assert!(row.min_ms.is_none());
        assert!(row.max_ms.is_none());
        assert!(row.avg_ms.is_none());
    }

    #[test]
    fn tolerates_absent_run_started_at_and_label_columns() {
        let (_dir, path) = write_log(
            "url,attempts,successes,failures,min_ms,max_ms,avg_ms\n\
             https://a.com,5,5,0,10,20,15\n",
        );
        let table = load_table(&path).expect("load should succeed");
        let row = &table.rows()[0];
        assert_eq!(row.run_started_at, "");
        assert_eq!(row.label, "");
        assert_eq!(row.url, "https://a.com");
    }

    #[test]
    fn load_does_not_mutate_the_source() {
        let content = format!("{HEADER}\n2026-08-01 10:00:00,Wifi,https://a.com,5,5,0,10,20,15\n");
        let (_dir, path) = write_log(&content);
        load_table(&path).expect("load should succeed");
        let after = std::fs::read_to_string(&path).expect("readable");
        assert_eq!(after, content);
    }

    #[test]
    fn round_trips_rows_written_by_the_store() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("results.csv");
        let row = SessionRow {
            run_started_at: "2026-08-01 10:00:00".to_string(),
            label: "Ethernet".to_string(),
            url: "https://a.com".to_string(),
            attempts: 5,
            successes: 4,
            failures: 1,
            min_ms: Some(12.34),
            max_ms: Some(56.78),
            avg_ms: Some(30.5),
        };
        crate::log::append_session(&path, &row).expect("append should succeed");

        let table = load_table(&path).expect("load should succeed");
        assert_eq!(table.rows(), std::slice::from_ref(&row));
    }
}
