//! Aggregation of fire events into per-cell monthly time series.
//!
//! - `series`: the dense per-cause monthly vectors owned by each grid cell
//! - `aggregator`: accumulates events (or previously aggregated rows) into series
//! - `builder`: materializes the per-cell series over a requested history range

pub mod aggregator;
pub mod builder;
pub mod series;

pub use aggregator::*;
pub use builder::*;
pub use series::*;
