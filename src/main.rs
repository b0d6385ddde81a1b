//! xput-process - per-second benchmark throughput/latency report
//!
//! Reads the per-thread xput log written by the benchmark (one record per
//! thread per second), sums every metric across threads for each second and
//! writes one normalized row per second.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Usage error, or any error while reading, parsing or writing

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;

use analysis::Aggregator;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{Report, ReportMetadata, Timebase};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let outcome = if args.init_config {
        handle_init_config()
    } else {
        run(&args)
    };

    if let Err(e) = outcome {
        error!("Aggregation failed: {:#}", e);
        eprintln!("An error occurred.");
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .xput-process.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging at the given level. Logs go to stderr.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Aggregate the input log and write the report.
fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration before logging so the file can turn on verbosity
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    init_logging(level);

    info!("xput-process v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let timebase = Timebase::new(args.ticks_per_sec()?);
    debug!(
        "Timebase: {} ticks/s, {} ticks/us",
        timebase.ticks_per_sec(),
        timebase.factor()
    );

    // Step 1: Consume the whole input before touching the output
    let mut aggregator = Aggregator::new(config.input.strict_width);
    aggregator.read_file(args.input_path())?;

    // Step 2: Normalize per second
    let rows = aggregator.rows(&timebase)?;

    let report = Report {
        metadata: ReportMetadata {
            input: args.input_path().display().to_string(),
            ticks_per_sec: timebase.ticks_per_sec(),
            timebase_factor: timebase.factor(),
            thread_count: aggregator.thread_count(),
            records_read: aggregator.records(),
            seconds_reported: rows.len(),
        },
        rows,
    };

    // Step 3: Render and write
    let content = report::render(&report, config.report.format, config.report.include_debt)?;
    report::write_report(&content, args.output_path())?;

    info!(
        "Wrote {} report for {} seconds in {:.3}s",
        config.report.format,
        report.metadata.seconds_reported,
        start_time.elapsed().as_secs_f64()
    );

    if !args.quiet {
        println!(
            "📊 {} records from {} threads over {} seconds",
            report.metadata.records_read,
            report.metadata.thread_count,
            report.metadata.seconds_reported
        );
        println!("✅ Report saved to: {}", args.output_path().display());
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    Ok(Config::load_default()?.unwrap_or_default())
}
