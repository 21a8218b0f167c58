//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments into a `RunConfig`
//! - runs the requested stage(s) via `pipeline`
//! - prints summaries/rankings and writes the optional manifest

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DirArgs, PipelineArgs};
use crate::domain::{IngestMode, PredictionRecord, RunConfig};
use crate::error::AppError;
use crate::grid::TimeIndex;
use crate::io::manifest::{RunManifest, write_manifest};
use crate::report::ForecastSummary;

pub mod pipeline;

const DEFAULT_OUTPUT_DIR: &str = "csv_outputs";
const DEFAULT_RENDER_DIR: &str = "render/public/csv";
const OUTPUT_DIR_ENV: &str = "WILDFIRE_OUTPUT_DIR";
const RENDER_DIR_ENV: &str = "WILDFIRE_RENDER_DIR";

/// Entry point for the `wildfire` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Process(args) => handle_process(&run_config_from_args(&args)?),
        Command::Predict(args) => handle_predict(&run_config_from_args(&args)?),
        Command::Partition(args) => handle_partition(&run_config_from_args(&args)?),
        Command::Run(args) => handle_run(&run_config_from_args(&args)?),
        Command::Clean(dirs) => handle_clean(&dirs),
    }
}

fn init_tracing() {
    // Logs go to stderr; stdout carries the reports.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_process(config: &RunConfig) -> Result<(), AppError> {
    info!(inputs = config.inputs.len(), history = %config.history, "processing raw fire records");
    let summary = pipeline::run_process(config)?;
    println!("{}", crate::report::format_process_summary(&summary, config));
    Ok(())
}

fn handle_predict(config: &RunConfig) -> Result<(), AppError> {
    info!(history = %config.history, horizon = %config.horizon, "running prediction");
    let (summary, records) = pipeline::run_predict(config)?;
    print_forecast(&summary, &records, config);

    if let Some(path) = &config.manifest {
        write_manifest(path, &manifest_for(&summary, config))?;
    }
    Ok(())
}

fn handle_partition(config: &RunConfig) -> Result<(), AppError> {
    let report = pipeline::run_partition(config)?;
    println!(
        "Wrote {} render files ({} rows) to {}",
        report.files_written,
        report.rows_written,
        config.render_dir.display()
    );
    Ok(())
}

fn handle_run(config: &RunConfig) -> Result<(), AppError> {
    handle_process(config)?;
    handle_predict(config)?;
    handle_partition(config)
}

fn handle_clean(dirs: &DirArgs) -> Result<(), AppError> {
    let output_dir = resolve_dir(dirs.output_dir.as_deref(), OUTPUT_DIR_ENV, DEFAULT_OUTPUT_DIR);
    let render_dir = resolve_dir(dirs.render_dir.as_deref(), RENDER_DIR_ENV, DEFAULT_RENDER_DIR);
    let removed = crate::io::clean::remove_output_dirs(&[output_dir.as_path(), render_dir.as_path()])?;
    println!("Cleaned {} director{}", removed.len(), if removed.len() == 1 { "y" } else { "ies" });
    Ok(())
}

fn print_forecast(summary: &ForecastSummary, records: &[PredictionRecord], config: &RunConfig) {
    println!("{}", crate::report::format_forecast_summary(summary, config));
    if config.top_n > 0 {
        let ranked = crate::report::rank_cells(records, config.top_n);
        println!("{}", crate::report::format_rankings(&ranked));
    }
}

fn manifest_for(summary: &ForecastSummary, config: &RunConfig) -> RunManifest {
    RunManifest {
        tool: "wildfire".to_string(),
        generated_at: Local::now(),
        history_first_year: config.history.first_year(),
        history_last_year: config.history.last_year(),
        horizon_first_year: config.horizon.first_year(),
        horizon_last_year: config.horizon.last_year(),
        resolution_degrees: config.resolution,
        history_rows: summary.history_rows,
        cells: summary.cells,
        prediction_rows: summary.prediction_rows,
    }
}

pub fn run_config_from_args(args: &PipelineArgs) -> Result<RunConfig, AppError> {
    let history = TimeIndex::new(args.first_year, args.last_year)
        .map_err(|e| AppError::new(2, format!("Invalid history range: {e}")))?;
    let horizon = TimeIndex::new(args.predict_start, args.predict_end)
        .map_err(|e| AppError::new(2, format!("Invalid prediction range: {e}")))?;
    if !(args.resolution.is_finite() && args.resolution > 0.0) {
        return Err(AppError::new(2, "Grid resolution must be > 0."));
    }

    Ok(RunConfig {
        inputs: args.inputs.clone(),
        output_dir: resolve_dir(args.dirs.output_dir.as_deref(), OUTPUT_DIR_ENV, DEFAULT_OUTPUT_DIR),
        render_dir: resolve_dir(args.dirs.render_dir.as_deref(), RENDER_DIR_ENV, DEFAULT_RENDER_DIR),
        history,
        horizon,
        resolution: args.resolution,
        ingest_mode: if args.lenient {
            IngestMode::Lenient
        } else {
            IngestMode::Strict
        },
        top_n: args.top,
        manifest: args.manifest.clone(),
    })
}

/// Flag, then environment (`.env` included), then built-in default.
fn resolve_dir(flag: Option<&Path>, env_key: &str, default: &str) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    std::env::var_os(env_key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
