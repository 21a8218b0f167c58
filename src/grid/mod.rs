//! Spatial and temporal keying.
//!
//! - `cell`: rounds coordinates down onto a fixed-resolution lat/lon grid
//! - `time_index`: bijection between (year, month) and a dense vector offset

pub mod cell;
pub mod time_index;

pub use cell::*;
pub use time_index::*;
