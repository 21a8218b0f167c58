//! Run manifest JSON.
//!
//! A small machine-readable record of what a `predict`/`run` invocation did,
//! written next to the CSV outputs when `--manifest` is given.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub history_first_year: i32,
    pub history_last_year: i32,
    pub horizon_first_year: i32,
    pub horizon_last_year: i32,
    pub resolution_degrees: f64,
    pub history_rows: usize,
    pub cells: usize,
    pub prediction_rows: usize,
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create manifest '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::new(2, format!("Failed to write manifest JSON: {e}")))?;
    Ok(())
}
