//! Dense monthly acreage vectors for a single grid cell.
//!
//! Every cell owns three vectors (natural/human/unknown) of length
//! `TimeIndex::len()`. The vectors are allocated once and never resized; slots
//! that no event touched stay at zero.

use crate::domain::{AcreageRow, Cause};
use crate::error::DataError;
use crate::grid::{GridCell, TimeIndex};

#[derive(Debug, Clone, PartialEq)]
pub struct CellTimeSeries {
    index: TimeIndex,
    natural_acres: Vec<f64>,
    human_acres: Vec<f64>,
    unknown_acres: Vec<f64>,
    /// Slots written by at least one observation (even a zero-acre one).
    observed: Vec<bool>,
}

impl CellTimeSeries {
    pub fn new(index: TimeIndex) -> Self {
        let len = index.len();
        Self {
            index,
            natural_acres: vec![0.0; len],
            human_acres: vec![0.0; len],
            unknown_acres: vec![0.0; len],
            observed: vec![false; len],
        }
    }

    pub fn index(&self) -> TimeIndex {
        self.index
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn series(&self, cause: Cause) -> &[f64] {
        match cause {
            Cause::Natural => &self.natural_acres,
            Cause::Human => &self.human_acres,
            Cause::Unknown => &self.unknown_acres,
        }
    }

    fn series_mut(&mut self, cause: Cause) -> &mut [f64] {
        match cause {
            Cause::Natural => &mut self.natural_acres,
            Cause::Human => &mut self.human_acres,
            Cause::Unknown => &mut self.unknown_acres,
        }
    }

    /// Accumulate acreage into the (cause, year, month) slot.
    pub fn add(&mut self, cause: Cause, year: i32, month: u32, acres: f64) -> Result<(), DataError> {
        let offset = self.index.to_offset(year, month)?;
        self.add_at(cause, offset, acres);
        Ok(())
    }

    pub(crate) fn add_at(&mut self, cause: Cause, offset: usize, acres: f64) {
        self.series_mut(cause)[offset] += acres;
        self.observed[offset] = true;
    }

    pub fn get(&self, cause: Cause, year: i32, month: u32) -> Result<f64, DataError> {
        let offset = self.index.to_offset(year, month)?;
        Ok(self.series(cause)[offset])
    }

    pub fn observed_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.observed
            .iter()
            .enumerate()
            .filter_map(|(offset, seen)| seen.then_some(offset))
    }

    /// Sum over all slots for one cause.
    pub fn total(&self, cause: Cause) -> f64 {
        self.series(cause).iter().sum()
    }

    /// Flatten one slot into a CSV row keyed by `cell`.
    pub fn row(&self, cell: GridCell, offset: usize) -> Result<AcreageRow, DataError> {
        let ym = self.index.from_offset(offset)?;
        Ok(AcreageRow {
            latitude: cell.latitude(),
            longitude: cell.longitude(),
            year: ym.year,
            month: ym.month,
            natural_acres_burned: self.natural_acres[offset],
            human_acres_burned: self.human_acres[offset],
            unknown_acres_burned: self.unknown_acres[offset],
        })
    }

    /// Copy this series onto another time index.
    ///
    /// Slots outside `index` that were observed are an `OutOfRange` error rather
    /// than being dropped.
    pub fn reindex(&self, index: TimeIndex) -> Result<CellTimeSeries, DataError> {
        if index == self.index {
            return Ok(self.clone());
        }
        let mut out = CellTimeSeries::new(index);
        for offset in self.observed_offsets() {
            let ym = self.index.from_offset(offset)?;
            let target = index.to_offset(ym.year, ym.month)?;
            for cause in Cause::ALL {
                out.add_at(cause, target, self.series(cause)[offset]);
            }
        }
        Ok(out)
    }
}
