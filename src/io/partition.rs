//! Split history + prediction rows into one CSV per calendar month.
//!
//! The render front-end loads `{month}{year}.csv` (e.g. `71995.csv` for July
//! 1995) for each frame, so every month in the requested range gets a file,
//! header-only when nothing burned.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::AcreageRow;
use crate::error::AppError;
use crate::grid::{TimeIndex, YearMonth};
use crate::io::export::write_rows;
use crate::io::ingest::read_acreage_rows;

#[derive(Debug, Clone, Default)]
pub struct PartitionReport {
    pub sources: Vec<PathBuf>,
    pub rows_read: usize,
    pub rows_written: usize,
    pub files_written: usize,
}

/// File name used for one render period.
pub fn period_file_name(period: YearMonth) -> String {
    format!("{}{}.csv", period.month, period.year)
}

/// Read every existing file in `sources`, then write one file per month of `range`.
///
/// Missing sources are skipped; if none exist the run fails with exit code 3.
pub fn partition_for_render(sources: &[PathBuf], render_dir: &Path, range: TimeIndex) -> Result<PartitionReport, AppError> {
    let mut report = PartitionReport::default();
    let mut by_period: BTreeMap<YearMonth, Vec<AcreageRow>> = BTreeMap::new();

    for source in sources {
        if !source.exists() {
            warn!(path = %source.display(), "render source missing; skipping");
            continue;
        }
        let read = read_acreage_rows(source, |row| {
            by_period.entry(YearMonth::new(row.year, row.month)).or_default().push(row);
            Ok(())
        })?;
        report.rows_read += read.rows_read;
        report.sources.push(source.clone());
    }

    if report.sources.is_empty() {
        return Err(AppError::new(3, "No history or prediction CSV found to partition."));
    }

    create_dir_all(render_dir).map_err(|e| {
        AppError::new(2, format!("Failed to create render dir '{}': {e}", render_dir.display()))
    })?;

    for period in range.months() {
        let rows = by_period.get(&period).map(Vec::as_slice).unwrap_or(&[]);
        let path = render_dir.join(period_file_name(period));
        let file = File::create(&path)
            .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
        write_rows(file, rows, &path)?;
        report.rows_written += rows.len();
        report.files_written += 1;
    }

    info!(
        dir = %render_dir.display(),
        files = report.files_written,
        rows = report.rows_written,
        "wrote render partitions"
    );
    Ok(report)
}
