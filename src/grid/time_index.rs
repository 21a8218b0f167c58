//! Month-resolution time index over an inclusive year range.
//!
//! `offset = (year - first_year) * 12 + (month - 1)`
//!
//! The history and the forecast horizon each get their own instance; an offset
//! is only meaningful relative to the index that produced it.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

pub const MONTHS_PER_YEAR: usize = 12;

/// Longest accepted range; every cell allocates dense vectors over the whole span.
pub const MAX_SPAN_YEARS: i32 = 1_000;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeIndex {
    first_year: i32,
    last_year: i32,
}

impl TimeIndex {
    pub fn new(first_year: i32, last_year: i32) -> Result<Self, DataError> {
        if first_year > last_year {
            return Err(DataError::InvalidRange(format!(
                "first year {first_year} is after last year {last_year}"
            )));
        }
        match last_year.checked_sub(first_year) {
            Some(span) if span < MAX_SPAN_YEARS => Ok(Self { first_year, last_year }),
            _ => Err(DataError::InvalidRange(format!(
                "{first_year}-{last_year} spans more than {MAX_SPAN_YEARS} years"
            ))),
        }
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.last_year
    }

    pub fn years(&self) -> usize {
        (self.last_year - self.first_year) as usize + 1
    }

    /// Number of months covered (length of every dense series over this index).
    pub fn len(&self) -> usize {
        self.years() * MONTHS_PER_YEAR
    }

    /// A constructed index always spans at least one year.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, year: i32, month: u32) -> bool {
        (self.first_year..=self.last_year).contains(&year) && (1..=12).contains(&month)
    }

    pub fn to_offset(&self, year: i32, month: u32) -> Result<usize, DataError> {
        if !self.contains(year, month) {
            return Err(DataError::OutOfRange {
                year,
                month,
                first_year: self.first_year,
                last_year: self.last_year,
            });
        }
        Ok((year - self.first_year) as usize * MONTHS_PER_YEAR + (month as usize - 1))
    }

    pub fn from_offset(&self, offset: usize) -> Result<YearMonth, DataError> {
        if offset >= self.len() {
            return Err(DataError::OffsetOutOfRange { offset, len: self.len() });
        }
        let year = self.first_year + (offset / MONTHS_PER_YEAR) as i32;
        let month = (offset % MONTHS_PER_YEAR) as u32 + 1;
        Ok(YearMonth { year, month })
    }

    /// All months in offset order.
    pub fn months(self) -> impl Iterator<Item = YearMonth> {
        (self.first_year..=self.last_year)
            .flat_map(|year| (1..=MONTHS_PER_YEAR as u32).map(move |month| YearMonth { year, month }))
    }
}

impl std::fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first_year, self.last_year)
    }
}
