//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::OutputFormat;
use anyhow::{ensure, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::{Path, PathBuf};

/// xput-process - per-second throughput/latency report from a benchmark xput log
///
/// Sums the per-thread samples of every second, converts tick-based latencies
/// to microseconds and averages them over the thread count.
///
/// Examples:
///   xput-process xput.data output.data 2200000000
///   xput-process xput.data output.json 2200000000 --format json
///   xput-process --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Per-thread xput log to aggregate
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Report file to create (overwritten if it exists)
    #[arg(value_name = "OUTPUT", required_unless_present = "init_config")]
    pub output: Option<PathBuf>,

    /// Clock ticks per second of the machine that produced the log
    ///
    /// E.g. 2200000000 for a 2.2GHz TSC.
    #[arg(value_name = "TICKS_PER_SEC", required_unless_present = "init_config")]
    pub ticks_per_sec: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .xput-process.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT", env = "XPUT_PROCESS_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Append the normalized debt column to the report
    #[arg(long)]
    pub include_debt: bool,

    /// Only accept records with exactly 15, 18 or 24 fields
    #[arg(long)]
    pub strict_width: bool,

    /// Generate a default .xput-process.toml configuration file
    #[arg(long, conflicts_with_all = ["input", "output", "ticks_per_sec"])]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Usage errors print clap's message and exit with status 1; `--help`
    /// and `--version` exit normally.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
                _ => {
                    let _ = e.print();
                    std::process::exit(1);
                }
            },
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Input file path. Empty when running `--init-config`.
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or(Path::new(""))
    }

    /// Output file path. Empty when running `--init-config`.
    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(Path::new(""))
    }

    /// Parse the ticks-per-second argument.
    pub fn ticks_per_sec(&self) -> Result<f64> {
        let raw = self.ticks_per_sec.as_deref().unwrap_or("").trim();
        let ticks: f64 = raw
            .parse()
            .with_context(|| format!("Invalid ticks per second: {:?}", raw))?;
        ensure!(
            ticks.is_finite() && ticks > 0.0,
            "Ticks per second must be a positive number, got {}",
            raw
        );
        Ok(ticks)
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
