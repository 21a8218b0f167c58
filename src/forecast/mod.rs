//! Per-cell, per-cause trend forecasting.
//!
//! Responsibilities:
//!
//! - find each series' peak fire month (`peak`)
//! - fit a season-aware linear trend and project it over the horizon (`forecaster`)
//! - run cells in parallel and flatten non-empty months into prediction rows

pub mod forecaster;
pub mod peak;

pub use forecaster::*;
pub use peak::*;
