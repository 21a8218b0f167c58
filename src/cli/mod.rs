//! Command-line parsing for the wildfire aggregation/forecast pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation/forecast code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wildfire", version, about = "Gridded wildfire history aggregation and trend forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate raw fire records into `processed.csv` (cell × month × cause acreage).
    Process(PipelineArgs),
    /// Fit per-cell trends on `processed.csv` and write `predict.csv`.
    Predict(PipelineArgs),
    /// Split history + predictions into one CSV per month for the renderer.
    Partition(PipelineArgs),
    /// Process, predict and partition in one go.
    Run(PipelineArgs),
    /// Remove the output and render directories.
    Clean(DirArgs),
}

/// Output locations.
///
/// When a flag is omitted, `WILDFIRE_OUTPUT_DIR` / `WILDFIRE_RENDER_DIR`
/// (environment or `.env`) are consulted before the built-in defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct DirArgs {
    /// Directory for `processed.csv` and `predict.csv` [default: csv_outputs].
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for per-month render CSVs [default: render/public/csv].
    #[arg(long, value_name = "DIR")]
    pub render_dir: Option<PathBuf>,
}

/// Options shared by the pipeline stages.
#[derive(Debug, Args, Clone)]
pub struct PipelineArgs {
    /// Raw fire CSV file(s). Required by `process` and `run`.
    #[arg(short = 'i', long = "input", value_name = "CSV")]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub dirs: DirArgs,

    /// First year of historical data.
    #[arg(long, default_value_t = 1992)]
    pub first_year: i32,

    /// Last year of historical data.
    #[arg(long, default_value_t = 2015)]
    pub last_year: i32,

    /// First year to forecast.
    #[arg(long, default_value_t = 2016)]
    pub predict_start: i32,

    /// Last year to forecast.
    #[arg(long, default_value_t = 2024)]
    pub predict_end: i32,

    /// Grid cell edge in degrees.
    #[arg(long, default_value_t = 0.5)]
    pub resolution: f64,

    /// Skip malformed raw rows (reported) instead of aborting.
    #[arg(long)]
    pub lenient: bool,

    /// Show the top-N cells by predicted acreage.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Write a JSON run manifest to this path.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,
}
