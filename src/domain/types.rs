//! Shared domain types.
//!
//! These are small value types that flow between the ingest, aggregation,
//! forecasting and export stages.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::grid::TimeIndex;

/// Statistical cause code for lightning.
const CAUSE_CODE_NATURAL: i64 = 1;
/// Statistical cause code for "missing/undetermined".
const CAUSE_CODE_UNDETERMINED: i64 = 13;

/// Ignition origin of a fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cause {
    Natural,
    Human,
    Unknown,
}

impl Cause {
    pub const ALL: [Cause; 3] = [Cause::Natural, Cause::Human, Cause::Unknown];

    /// Classify a raw statistical cause code.
    ///
    /// `1` is lightning, `13` (or no code at all) is undetermined, and every
    /// other code is some form of human activity.
    pub fn classify(code: Option<i64>) -> Cause {
        match code {
            Some(CAUSE_CODE_NATURAL) => Cause::Natural,
            Some(CAUSE_CODE_UNDETERMINED) | None => Cause::Unknown,
            Some(_) => Cause::Human,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Cause::Natural => "natural",
            Cause::Human => "human",
            Cause::Unknown => "unknown",
        }
    }
}

/// A single normalized fire record.
#[derive(Debug, Clone, PartialEq)]
pub struct FireEvent {
    pub latitude: f64,
    pub longitude: f64,
    /// Discovery date, or containment date when discovery is missing.
    pub event_date: NaiveDate,
    pub cause_code: Option<i64>,
    pub acres_burned: f64,
}

impl FireEvent {
    pub fn year(&self) -> i32 {
        self.event_date.year()
    }

    pub fn month(&self) -> u32 {
        self.event_date.month()
    }

    pub fn cause(&self) -> Cause {
        Cause::classify(self.cause_code)
    }
}

/// Burned acreage for one grid cell and one month, split by cause.
///
/// This is both the aggregated-history row and the prediction row; the CSV
/// column names are the serde field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcreageRow {
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    pub month: u32,
    pub natural_acres_burned: f64,
    pub human_acres_burned: f64,
    pub unknown_acres_burned: f64,
}

/// A forecast row, one per (cell, month) with at least one non-zero cause.
pub type PredictionRecord = AcreageRow;

impl AcreageRow {
    pub fn acres(&self, cause: Cause) -> f64 {
        match cause {
            Cause::Natural => self.natural_acres_burned,
            Cause::Human => self.human_acres_burned,
            Cause::Unknown => self.unknown_acres_burned,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.natural_acres_burned == 0.0 && self.human_acres_burned == 0.0 && self.unknown_acres_burned == 0.0
    }
}

/// How row-level problems in raw input are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// The first malformed row aborts the run.
    Strict,
    /// Malformed rows are reported and skipped.
    Lenient,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env`/environment defaults for directories).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub render_dir: PathBuf,

    /// Range of the historical data (aggregation and regression samples).
    pub history: TimeIndex,
    /// Range to forecast.
    pub horizon: TimeIndex,

    /// Grid cell edge in degrees.
    pub resolution: f64,
    pub ingest_mode: IngestMode,

    pub top_n: usize,
    pub manifest: Option<PathBuf>,
}

impl RunConfig {
    pub fn processed_csv(&self) -> PathBuf {
        self.output_dir.join("processed.csv")
    }

    pub fn predict_csv(&self) -> PathBuf {
        self.output_dir.join("predict.csv")
    }
}
