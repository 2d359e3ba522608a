use std::fs::OpenOptions;
use std::path::Path;

use crate::error::LatmeterError;
use crate::table::{SessionRow, LOG_COLUMNS};

/// Append one session row to the persistent log.
///
/// Creates the parent directory and the file on first use; the header row is
/// written exactly once, only when the file did not exist yet. Existing
/// content is never rewritten or truncated.
pub fn append_session(path: impl AsRef<Path>, row: &SessionRow) -> Result<(), LatmeterError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file_exists = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if !file_exists {
        writer.write_record(LOG_COLUMNS)?;
    }
    writer.serialize(row)?;
    writer.flush()?;

    tracing::debug!(url = %row.url, path = %path.display(), "session row appended");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
