//! Event aggregation onto the (cell, month) grid.
//!
//! Each ingested observation is keyed by grid cell and month offset and its
//! acreage is *summed* into the slot for its cause. Two fires in the same cell,
//! month and cause therefore add up; nothing is ever overwritten.
//!
//! `finalize` consumes the aggregator, so ingestion after finalization is a
//! compile error rather than a runtime check.

use std::collections::HashMap;

use crate::aggregate::CellTimeSeries;
use crate::domain::{AcreageRow, Cause, FireEvent};
use crate::error::DataError;
use crate::grid::{GridCell, GridKeyer, TimeIndex};

#[derive(Debug, Clone)]
pub struct Aggregator {
    keyer: GridKeyer,
    index: TimeIndex,
    cells: HashMap<GridCell, CellTimeSeries>,
    observations: usize,
}

impl Aggregator {
    pub fn new(index: TimeIndex, keyer: GridKeyer) -> Self {
        Self {
            keyer,
            index,
            cells: HashMap::new(),
            observations: 0,
        }
    }

    /// Add a single raw fire. Returns the cell it landed in.
    pub fn ingest(&mut self, event: &FireEvent) -> Result<GridCell, DataError> {
        check_coordinate("latitude", event.latitude)?;
        check_coordinate("longitude", event.longitude)?;
        check_acres("fire_size", event.acres_burned)?;

        // Resolve the offset before touching the map so a rejected event
        // never creates an empty cell.
        let offset = self.index.to_offset(event.year(), event.month())?;
        let cell = self.keyer.key(event.latitude, event.longitude);
        check_cell(cell)?;

        self.series_for(cell).add_at(event.cause(), offset, event.acres_burned);
        self.observations += 1;
        Ok(cell)
    }

    /// Add a previously aggregated (cell, month) row, accumulating all three causes.
    pub fn ingest_row(&mut self, row: &AcreageRow) -> Result<GridCell, DataError> {
        check_coordinate("latitude", row.latitude)?;
        check_coordinate("longitude", row.longitude)?;
        for cause in Cause::ALL {
            check_acres(acres_field(cause), row.acres(cause))?;
        }

        let offset = self.index.to_offset(row.year, row.month)?;
        // Corners written by `to_rows` key back to themselves.
        let cell = self.keyer.key(row.latitude, row.longitude);
        check_cell(cell)?;

        let series = self.series_for(cell);
        for cause in Cause::ALL {
            series.add_at(cause, offset, row.acres(cause));
        }
        self.observations += 1;
        Ok(cell)
    }

    fn series_for(&mut self, cell: GridCell) -> &mut CellTimeSeries {
        let index = self.index;
        self.cells.entry(cell).or_insert_with(|| CellTimeSeries::new(index))
    }

    pub fn finalize(self) -> AggregatedGrid {
        AggregatedGrid {
            index: self.index,
            cells: self.cells,
            observations: self.observations,
        }
    }
}

/// The completed cell → series mapping.
#[derive(Debug, Clone)]
pub struct AggregatedGrid {
    index: TimeIndex,
    cells: HashMap<GridCell, CellTimeSeries>,
    observations: usize,
}

impl AggregatedGrid {
    pub fn index(&self) -> TimeIndex {
        self.index
    }

    pub fn cells(&self) -> &HashMap<GridCell, CellTimeSeries> {
        &self.cells
    }

    pub fn get(&self, cell: &GridCell) -> Option<&CellTimeSeries> {
        self.cells.get(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of events/rows successfully ingested.
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Flatten to one row per observed (cell, month), ordered by cell then time.
    pub fn to_rows(&self) -> Result<Vec<AcreageRow>, DataError> {
        let mut cells: Vec<(&GridCell, &CellTimeSeries)> = self.cells.iter().collect();
        cells.sort_by(|a, b| a.0.cmp(b.0));

        let mut rows = Vec::new();
        for (cell, series) in cells {
            for offset in series.observed_offsets() {
                rows.push(series.row(*cell, offset)?);
            }
        }
        Ok(rows)
    }
}

fn acres_field(cause: Cause) -> &'static str {
    match cause {
        Cause::Natural => "natural_acres_burned",
        Cause::Human => "human_acres_burned",
        Cause::Unknown => "unknown_acres_burned",
    }
}

fn check_coordinate(field: &'static str, value: f64) -> Result<(), DataError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DataError::parse(field, value.to_string(), "a finite coordinate"))
    }
}

/// A finite coordinate can still bucket to infinity near `f64::MAX`.
fn check_cell(cell: GridCell) -> Result<(), DataError> {
    check_coordinate("latitude", cell.latitude())?;
    check_coordinate("longitude", cell.longitude())
}

fn check_acres(field: &'static str, value: f64) -> Result<(), DataError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DataError::parse(field, value.to_string(), "a non-negative acreage"))
    }
}
