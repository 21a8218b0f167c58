//! Export acreage rows (aggregated history or predictions) to CSV.
//!
//! An empty row set writes no file at all, so a stale file is never replaced by
//! a header-only one.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::AcreageRow;
use crate::error::AppError;

/// Column order used for every acreage CSV we write.
pub const ACREAGE_COLUMNS: [&str; 7] = [
    "latitude",
    "longitude",
    "year",
    "month",
    "natural_acres_burned",
    "human_acres_burned",
    "unknown_acres_burned",
];

/// Write rows to `path`. Returns `false` (and writes nothing) when `rows` is empty.
pub fn write_rows_csv(path: &Path, rows: &[AcreageRow]) -> Result<bool, AppError> {
    if rows.is_empty() {
        info!(path = %path.display(), "no rows; skipping file");
        return Ok(false);
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_rows(file, rows, path)?;

    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(true)
}

/// Write a header followed by `rows` (possibly none) to `out`.
pub(crate) fn write_rows<W: std::io::Write>(out: W, rows: &[AcreageRow], path: &Path) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

    writer
        .write_record(ACREAGE_COLUMNS)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header to '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row to '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}
