//! `wildfire-grid` library crate.
//!
//! The binary (`wildfire`) is a thin wrapper around this library so that:
//!
//! - aggregation and forecasting are testable without spawning processes
//! - the CSV layer stays separate from the numeric core
//!
//! Data flow: raw fire records -> `aggregate` (grid cell x month x cause) ->
//! `forecast` (per-cell, per-cause linear trend) -> `io` (CSV files for the
//! render front-end).

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod grid;
pub mod io;
pub mod math;
pub mod report;
