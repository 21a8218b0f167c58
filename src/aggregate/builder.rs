//! Materialize per-cell series over a requested history range.
//!
//! In a normal run the requested range equals the aggregator's range and this
//! is a straight copy. Cells are returned in a `BTreeMap` so downstream stages
//! iterate them in a stable (latitude, longitude) order.

use std::collections::BTreeMap;

use crate::aggregate::{AggregatedGrid, CellTimeSeries};
use crate::error::DataError;
use crate::grid::{GridCell, TimeIndex};

pub fn build_cell_series(
    grid: &AggregatedGrid,
    history: TimeIndex,
) -> Result<BTreeMap<GridCell, CellTimeSeries>, DataError> {
    grid.cells()
        .iter()
        .map(|(cell, series)| Ok((*cell, series.reindex(history)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::aggregate::Aggregator;
    use crate::domain::{Cause, FireEvent};
    use crate::grid::GridKeyer;

    fn grid() -> AggregatedGrid {
        let mut agg = Aggregator::new(TimeIndex::new(2000, 2004).unwrap(), GridKeyer::default());
        for (lat, lon, month) in [(45.3, -110.8, 8), (12.7, 3.1, 2), (45.1, -110.6, 9)] {
            agg.ingest(&FireEvent {
                latitude: lat,
                longitude: lon,
                event_date: NaiveDate::from_ymd_opt(2002, month, 1).unwrap(),
                cause_code: Some(4),
                acres_burned: 5.0,
            })
            .unwrap();
        }
        agg.finalize()
    }

    #[test]
    fn one_series_per_observed_cell_in_order() {
        let grid = grid();
        let cells = build_cell_series(&grid, grid.index()).unwrap();
        let keys: Vec<GridCell> = cells.keys().copied().collect();
        assert_eq!(keys, vec![GridCell::new(12.5, 3.0), GridCell::new(45.0, -111.0)]);

        let series = &cells[&GridCell::new(45.0, -111.0)];
        assert_eq!(series.len(), 60);
        assert_eq!(series.get(Cause::Human, 2002, 8).unwrap(), 5.0);
        assert_eq!(series.get(Cause::Human, 2002, 9).unwrap(), 5.0);
        // unobserved months default to zero
        assert_eq!(series.get(Cause::Human, 2002, 10).unwrap(), 0.0);
    }

    #[test]
    fn wider_range_zero_fills() {
        let grid = grid();
        let cells = build_cell_series(&grid, TimeIndex::new(1995, 2010).unwrap()).unwrap();
        let series = &cells[&GridCell::new(12.5, 3.0)];
        assert_eq!(series.len(), 16 * 12);
        assert_eq!(series.total(Cause::Human), 5.0);
    }

    #[test]
    fn range_that_drops_observations_fails() {
        let grid = grid();
        assert!(build_cell_series(&grid, TimeIndex::new(2003, 2004).unwrap()).is_err());
    }
}
