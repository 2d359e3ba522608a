use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LatmeterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("latency log not found: {}", .0.display())]
    LogMissing(PathBuf),

    #[error("latency log contains no rows: {}", .0.display())]
    LogEmpty(PathBuf),

    #[error("latency log could not be parsed: {0}")]
    LogMalformed(String),

    #[error("latency log is missing required column: {0}")]
    SchemaColumnMissing(String),

    #[error("no latency data to analyze")]
    NoData,

    #[error("statistics computation failed in {operation}: {cause}")]
    StatsComputation { operation: String, cause: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl LatmeterError {
    /// Wrap a cause message as a statistics-computation failure, naming the
    /// operation that could not be completed.
    pub fn stats(operation: impl Into<String>, cause: impl Into<String>) -> Self {
        LatmeterError::StatsComputation {
            operation: operation.into(),
            cause: cause.into(),
        }
    }
}
