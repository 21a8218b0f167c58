//! CSV ingest and normalization.
//!
//! Two input schemas are read here:
//!
//! - raw fire records (`latitude, longitude, discovery_date, cont_date,
//!   stat_cause_code, fire_size`), normalized into `FireEvent`s
//! - aggregated history rows (`processed.csv`), deserialized into `AcreageRow`s
//!
//! Records are streamed into a caller-supplied sink (normally an `Aggregator`)
//! so raw events are never held in memory all at once.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Strict rows by default**: the first bad row aborts the run; `Lenient`
//!   mode skips bad rows and reports them with line numbers instead
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{AcreageRow, FireEvent, IngestMode};
use crate::error::{AppError, DataError};

const REQUIRED_FIRE_COLUMNS: [&str; 5] = ["latitude", "longitude", "discovery_date", "stat_cause_code", "fire_size"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub path: PathBuf,
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.message)
    }
}

/// Counters for one or more ingested files.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub files: usize,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.files += other.files;
        self.rows_read += other.rows_read;
        self.rows_used += other.rows_used;
        self.row_errors.extend(other.row_errors);
    }
}

/// Read raw fire records from `path` and feed each normalized event to `sink`.
///
/// Errors returned by the sink (e.g. an event outside the history range) are
/// treated like parse errors: fatal in `Strict` mode, skipped in `Lenient` mode.
pub fn read_fire_events<F>(path: &Path, mode: IngestMode, mut sink: F) -> Result<IngestReport, AppError>
where
    F: FnMut(FireEvent) -> Result<(), DataError>,
{
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in REQUIRED_FIRE_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::new(
                2,
                format!("Missing required column `{name}` in '{}'", path.display()),
            ));
        }
    }

    let mut report = IngestReport {
        files: 1,
        ..IngestReport::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        report.rows_read += 1;

        let outcome = match result {
            Ok(record) => parse_fire_record(&record, &header_map)
                .and_then(&mut sink)
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("CSV parse error: {e}")),
        };

        match outcome {
            Ok(()) => report.rows_used += 1,
            Err(message) => {
                let row_error = RowError {
                    path: path.to_path_buf(),
                    line,
                    message,
                };
                match mode {
                    IngestMode::Strict => return Err(AppError::new(2, row_error.to_string())),
                    IngestMode::Lenient => {
                        debug!(%row_error, "skipping fire record");
                        report.row_errors.push(row_error);
                    }
                }
            }
        }
    }

    if !report.row_errors.is_empty() {
        warn!(
            path = %path.display(),
            skipped = report.row_errors.len(),
            "skipped malformed fire records"
        );
    }
    info!(
        path = %path.display(),
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        "read fire records"
    );

    Ok(report)
}

/// Read aggregated history rows from `path` and feed each to `sink`.
///
/// This file is produced by the `process` stage, so any bad row is fatal.
pub fn read_acreage_rows<F>(path: &Path, mut sink: F) -> Result<IngestReport, AppError>
where
    F: FnMut(AcreageRow) -> Result<(), DataError>,
{
    let mut reader = open_reader(path)?;
    let mut report = IngestReport {
        files: 1,
        ..IngestReport::default()
    };

    for (idx, result) in reader.deserialize::<AcreageRow>().enumerate() {
        let line = idx + 2;
        report.rows_read += 1;
        let row = result.map_err(|e| AppError::new(2, format!("{}:{line}: {e}", path.display())))?;
        sink(row).map_err(|e| AppError::from_data(format!("{}:{line}", path.display()), e))?;
        report.rows_used += 1;
    }

    info!(path = %path.display(), rows = report.rows_used, "read acreage rows");
    Ok(report)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_fire_record(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<FireEvent, DataError> {
    let latitude = parse_f64("latitude", get_optional(record, header_map, "latitude"))?;
    let longitude = parse_f64("longitude", get_optional(record, header_map, "longitude"))?;
    let acres_burned = parse_f64("fire_size", get_optional(record, header_map, "fire_size"))?;
    let cause_code = parse_cause_code(get_optional(record, header_map, "stat_cause_code"))?;

    // Discovery date, falling back to containment date when it is blank.
    let event_date = match get_optional(record, header_map, "discovery_date") {
        Some(s) => parse_date("discovery_date", s)?,
        None => match get_optional(record, header_map, "cont_date") {
            Some(s) => parse_date("cont_date", s)?,
            None => return Err(DataError::parse("discovery_date", "", "a date (cont_date is also empty)")),
        },
    };

    Ok(FireEvent {
        latitude,
        longitude,
        event_date,
        cause_code,
        acres_burned,
    })
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(field: &'static str, s: Option<&str>) -> Result<f64, DataError> {
    let s = s.unwrap_or("");
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataError::parse(field, s, "a finite number")),
    }
}

/// Cause codes are integers, but some exports write them as floats (`9.0`).
fn parse_cause_code(s: Option<&str>) -> Result<Option<i64>, DataError> {
    let Some(s) = s else { return Ok(None) };
    if let Ok(code) = s.parse::<i64>() {
        return Ok(Some(code));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
        _ => Err(DataError::parse("stat_cause_code", s, "an integer cause code")),
    }
}

fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, DataError> {
    // US agency exports are month-first; ISO dates are accepted as well, with
    // or without a trailing time component.
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 7] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(DataError::parse(
        field,
        s,
        "a date (YYYY-MM-DD, YYYY/MM/DD or MM/DD/YYYY, optionally with a time)",
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_supported_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2010, 7, 4).unwrap();
        for s in [
            "2010-07-04",
            "2010/07/04",
            "07/04/2010",
            "7/4/2010",
            "2010-07-04 13:45:00",
            "2010-07-04T13:45:00",
            "7/4/2010 13:45",
        ] {
            assert_eq!(parse_date("discovery_date", s).unwrap(), expected, "{s}");
        }
        assert!(parse_date("discovery_date", "July 4th").is_err());
    }

    #[test]
    fn cause_codes_accept_float_spelling() {
        assert_eq!(parse_cause_code(Some("9")).unwrap(), Some(9));
        assert_eq!(parse_cause_code(Some("9.0")).unwrap(), Some(9));
        assert_eq!(parse_cause_code(None).unwrap(), None);
        assert!(parse_cause_code(Some("9.5")).is_err());
        assert!(parse_cause_code(Some("lightning")).is_err());
    }

    #[test]
    fn reads_events_with_containment_fallback() {
        let file = write_csv(
            "\u{feff}LATITUDE,LONGITUDE,DISCOVERY_DATE,CONT_DATE,STAT_CAUSE_CODE,FIRE_SIZE,STATE\n\
             34.05,-118.25,2010-07-14,2010-07-20,1,100,CA\n\
             40.1,-120.9,,2011-03-02,13.0,2.5,CA\n\
             41.0,-121.0,2012-08-01,,,0.1,CA\n",
        );
        let mut events = Vec::new();
        let report = read_fire_events(file.path(), IngestMode::Strict, |e| {
            events.push(e);
            Ok(())
        })
        .unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_used, 3);
        assert_eq!(events[0].event_date, NaiveDate::from_ymd_opt(2010, 7, 14).unwrap());
        assert_eq!(events[0].cause_code, Some(1));
        assert_eq!(events[1].event_date, NaiveDate::from_ymd_opt(2011, 3, 2).unwrap());
        assert_eq!(events[1].cause_code, Some(13));
        assert_eq!(events[2].cause_code, None);
        assert_eq!(events[2].acres_burned, 0.1);
    }

    #[test]
    fn strict_mode_stops_at_first_bad_row() {
        let file = write_csv(
            "latitude,longitude,discovery_date,cont_date,stat_cause_code,fire_size\n\
             34.0,-118.0,2010-07-14,,1,abc\n\
             34.0,-118.0,2010-07-14,,1,5\n",
        );
        let err = read_fire_events(file.path(), IngestMode::Strict, |_| Ok(())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains(":2:"), "{err}");
        assert!(err.message().contains("fire_size"), "{err}");
    }

    #[test]
    fn lenient_mode_collects_row_errors() {
        let file = write_csv(
            "latitude,longitude,discovery_date,cont_date,stat_cause_code,fire_size\n\
             34.0,-118.0,,,1,5\n\
             34.0,-118.0,2010-07-14,,1,5\n\
             1980-01-01,-118.0,2010-07-14,,1,5\n",
        );
        let mut used = 0;
        let report = read_fire_events(file.path(), IngestMode::Lenient, |_| {
            used += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(used, 1);
        assert_eq!(report.rows_used, 1);
        let lines: Vec<usize> = report.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn sink_errors_follow_the_mode() {
        let file = write_csv(
            "latitude,longitude,discovery_date,cont_date,stat_cause_code,fire_size\n\
             34.0,-118.0,1980-07-14,,1,5\n",
        );
        let out_of_range = || -> Result<(), DataError> {
            Err(DataError::OutOfRange {
                year: 1980,
                month: 7,
                first_year: 1992,
                last_year: 2015,
            })
        };
        assert!(read_fire_events(file.path(), IngestMode::Strict, |_| out_of_range()).is_err());
        let report = read_fire_events(file.path(), IngestMode::Lenient, |_| out_of_range()).unwrap();
        assert_eq!(report.row_errors.len(), 1);
    }

    #[test]
    fn missing_column_is_fatal() {
        let file = write_csv("latitude,longitude,discovery_date,stat_cause_code\n34,-118,2010-01-01,1\n");
        let err = read_fire_events(file.path(), IngestMode::Lenient, |_| Ok(())).unwrap_err();
        assert!(err.message().contains("fire_size"));
    }

    #[test]
    fn reads_acreage_rows_in_any_column_order() {
        let file = write_csv(
            "latitude,longitude,month,year,natural_acres_burned,human_acres_burned,unknown_acres_burned\n\
             34.0,-118.5,7,2010,100.0,0.0,0.0\n",
        );
        let mut rows = Vec::new();
        read_acreage_rows(file.path(), |r| {
            rows.push(r);
            Ok(())
        })
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].year, rows[0].month), (2010, 7));
        assert_eq!(rows[0].natural_acres_burned, 100.0);
    }

    #[test]
    fn bad_acreage_row_is_fatal() {
        let file = write_csv(
            "latitude,longitude,year,month,natural_acres_burned,human_acres_burned,unknown_acres_burned\n\
             34.0,-118.5,2010,7,lots,0.0,0.0\n",
        );
        assert!(read_acreage_rows(file.path(), |_| Ok(())).is_err());
    }
}
