//! Reporting utilities: per-cell rankings and formatted terminal output.
//!
//! Formatting lives here so the aggregation/forecast code stays free of
//! presentation concerns.

use std::collections::BTreeMap;

use crate::domain::{Cause, PredictionRecord, RunConfig};
use crate::grid::GridCell;
use crate::io::ingest::IngestReport;

/// Predicted acreage summed over the horizon for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTotal {
    pub cell: GridCell,
    pub natural: f64,
    pub human: f64,
    pub unknown: f64,
}

impl CellTotal {
    pub fn total(&self) -> f64 {
        self.natural + self.human + self.unknown
    }
}

/// Counters printed after the `process` stage.
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub ingest: IngestReport,
    pub cells: usize,
    pub rows_written: usize,
}

/// Counters printed after the `predict` stage.
#[derive(Debug, Clone)]
pub struct ForecastSummary {
    pub history_rows: usize,
    pub cells: usize,
    pub prediction_rows: usize,
}

/// Sum predictions per cell and return the `top_n` cells by total acreage.
///
/// Ties keep cell order, so the result is deterministic.
pub fn rank_cells(records: &[PredictionRecord], top_n: usize) -> Vec<CellTotal> {
    let mut totals: BTreeMap<GridCell, CellTotal> = BTreeMap::new();
    for r in records {
        let cell = GridCell::new(r.latitude, r.longitude);
        let entry = totals.entry(cell).or_insert_with(|| CellTotal {
            cell,
            natural: 0.0,
            human: 0.0,
            unknown: 0.0,
        });
        entry.natural += r.acres(Cause::Natural);
        entry.human += r.acres(Cause::Human);
        entry.unknown += r.acres(Cause::Unknown);
    }

    let mut ranked: Vec<CellTotal> = totals.into_values().collect();
    ranked.sort_by(|a, b| b.total().partial_cmp(&a.total()).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_n);
    ranked
}

pub fn format_process_summary(summary: &ProcessSummary, config: &RunConfig) -> String {
    let mut out = String::new();
    out.push_str("=== wildfire - aggregate ===\n");
    out.push_str(&format!(
        "History: {} | grid: {:.2} deg\n",
        config.history, config.resolution
    ));
    out.push_str(&format!(
        "Files: {} | rows read: {} | used: {} | skipped: {}\n",
        summary.ingest.files,
        summary.ingest.rows_read,
        summary.ingest.rows_used,
        summary.ingest.row_errors.len()
    ));
    for e in summary.ingest.row_errors.iter().take(10) {
        out.push_str(&format!("  ! {e}\n"));
    }
    if summary.ingest.row_errors.len() > 10 {
        out.push_str(&format!("  ! ... {} more\n", summary.ingest.row_errors.len() - 10));
    }
    out.push_str(&format!(
        "Cells: {} | aggregated rows: {}\n",
        summary.cells, summary.rows_written
    ));
    out
}

pub fn format_forecast_summary(summary: &ForecastSummary, config: &RunConfig) -> String {
    let mut out = String::new();
    out.push_str("=== wildfire - forecast ===\n");
    out.push_str(&format!("History: {} | horizon: {}\n", config.history, config.horizon));
    out.push_str(&format!(
        "History rows: {} | cells: {} | prediction rows: {}\n",
        summary.history_rows, summary.cells, summary.prediction_rows
    ));
    out
}

/// Format the top-cells table.
pub fn format_rankings(ranked: &[CellTotal]) -> String {
    let mut out = String::new();
    out.push_str("Top cells by predicted acres:\n");
    out.push_str(
        format!(
            "{:<20} {:>14} {:>14} {:>14} {:>14}\n",
            "cell", "natural", "human", "unknown", "total"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<20} {:-<14} {:-<14} {:-<14} {:-<14}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for c in ranked {
        out.push_str(
            format!(
                "{:<20} {:>14.1} {:>14.1} {:>14.1} {:>14.1}\n",
                c.cell.to_string(),
                c.natural,
                c.human,
                c.unknown,
                c.total()
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if ranked.is_empty() {
        out.push_str("(no non-zero predictions)\n");
    }
    out
}
