//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - aggregated/prediction CSV exports (`export`)
//! - per-period render files (`partition`)
//! - run manifest JSON (`manifest`)
//! - output directory cleanup (`clean`)

pub mod clean;
pub mod export;
pub mod ingest;
pub mod manifest;
pub mod partition;

pub use clean::*;
pub use export::*;
pub use ingest::*;
pub use manifest::*;
pub use partition::*;
