//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the ignition cause classification (`Cause`)
//! - normalized fire observations (`FireEvent`)
//! - flattened per-cell monthly rows (`AcreageRow` / `PredictionRecord`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
