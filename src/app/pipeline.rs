//! Shared stage logic used by the individual subcommands and by `run`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw CSV -> aggregate -> processed.csv -> cell series -> forecast -> predict.csv -> render partitions
//!
//! The CLI handlers in `app` only deal with printing.

use std::fs::{create_dir_all, remove_file};
use std::path::Path;

use tracing::{info, warn};

use crate::aggregate::{AggregatedGrid, Aggregator, build_cell_series};
use crate::domain::{PredictionRecord, RunConfig};
use crate::error::AppError;
use crate::forecast::Forecaster;
use crate::grid::{GridKeyer, TimeIndex};
use crate::io::ingest::{IngestReport, read_acreage_rows, read_fire_events};
use crate::io::export::write_rows_csv;
use crate::io::partition::{PartitionReport, partition_for_render};
use crate::report::{ForecastSummary, ProcessSummary};

/// Aggregate every raw input file into one grid.
pub fn aggregate_fires(config: &RunConfig) -> Result<(AggregatedGrid, IngestReport), AppError> {
    if config.inputs.is_empty() {
        return Err(AppError::new(2, "At least one `--input` CSV is required."));
    }
    let keyer = GridKeyer::new(config.resolution)?;
    let mut aggregator = Aggregator::new(config.history, keyer);
    let mut report = IngestReport::default();

    for path in &config.inputs {
        let file_report = read_fire_events(path, config.ingest_mode, |event| aggregator.ingest(&event).map(|_| ()))?;
        report.merge(file_report);
    }

    let grid = aggregator.finalize();
    info!(cells = grid.len(), events = grid.observations(), "aggregation finished");
    Ok((grid, report))
}

/// `process`: raw CSVs -> `processed.csv`.
pub fn run_process(config: &RunConfig) -> Result<ProcessSummary, AppError> {
    let (grid, ingest) = aggregate_fires(config)?;
    let rows = grid.to_rows()?;

    ensure_dir(&config.output_dir)?;
    write_or_clear(&config.processed_csv(), &rows)?;

    Ok(ProcessSummary {
        ingest,
        cells: grid.len(),
        rows_written: rows.len(),
    })
}

/// Rebuild the aggregated grid from `processed.csv`.
///
/// A missing file means the history was empty (nothing is written for an empty
/// aggregation), which yields an empty grid.
pub fn load_history(path: &Path, config: &RunConfig) -> Result<AggregatedGrid, AppError> {
    let keyer = GridKeyer::new(config.resolution)?;
    let mut aggregator = Aggregator::new(config.history, keyer);

    if path.exists() {
        read_acreage_rows(path, |row| aggregator.ingest_row(&row).map(|_| ()))?;
    } else {
        warn!(path = %path.display(), "no aggregated history found; nothing to forecast");
    }
    Ok(aggregator.finalize())
}

/// Forecast every cell of an aggregated grid.
pub fn forecast_grid(grid: &AggregatedGrid, config: &RunConfig) -> Result<Vec<PredictionRecord>, AppError> {
    let cells = build_cell_series(grid, config.history)?;
    let forecaster = Forecaster::new(config.history, config.horizon);
    let records = forecaster.forecast(&cells)?;
    info!(cells = cells.len(), rows = records.len(), "forecast finished");
    Ok(records)
}

/// `predict`: `processed.csv` -> `predict.csv`.
pub fn run_predict(config: &RunConfig) -> Result<(ForecastSummary, Vec<PredictionRecord>), AppError> {
    let grid = load_history(&config.processed_csv(), config)?;
    let records = forecast_grid(&grid, config)?;

    ensure_dir(&config.output_dir)?;
    write_or_clear(&config.predict_csv(), &records)?;

    let summary = ForecastSummary {
        history_rows: grid.observations(),
        cells: grid.len(),
        prediction_rows: records.len(),
    };
    Ok((summary, records))
}

/// `partition`: history + predictions -> one CSV per month from the first
/// history year through the last forecast year.
pub fn run_partition(config: &RunConfig) -> Result<PartitionReport, AppError> {
    let range = TimeIndex::new(config.history.first_year(), config.horizon.last_year())?;
    partition_for_render(
        &[config.processed_csv(), config.predict_csv()],
        &config.render_dir,
        range,
    )
}

/// Write `rows`, or drop a file left over from an earlier run when there is nothing to write.
fn write_or_clear(path: &Path, rows: &[crate::domain::AcreageRow]) -> Result<(), AppError> {
    if !write_rows_csv(path, rows)? && path.exists() {
        remove_file(path).map_err(|e| AppError::new(2, format!("Failed to remove stale '{}': {e}", path.display())))?;
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", dir.display())))
}
