//! Report generation.
//!
//! The text layout reproduces the legacy per-second report column for column:
//! a `#` header followed by one space-separated row per second.

use crate::models::{OutputFormat, Report, ReportRow};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Column names of the legacy text report.
pub const HEADER_COLUMNS: [&str; 22] = [
    "Second",
    "Xput",
    "avg_generic",
    "p50_insert",
    "p99_insert",
    "p50_generic",
    "p99_generic",
    "avg_init",
    "p50_init",
    "p99_init",
    "avg_commit",
    "p50_commit",
    "p99_commit",
    "avg_update",
    "p50_update",
    "p99_update",
    "p50_generic_b",
    "p50_generic_c",
    "p50_generic_total",
    "p99_generic_b",
    "p99_generic_c",
    "p99_generic_total",
];

/// Trailing column appended when debt reporting is enabled.
const DEBT_COLUMN: &str = "debt";

/// Printed in place of a value that was never measured.
const DEFAULTED: &str = "0";

/// Format a float as its shortest round-trip representation.
///
/// Integral values keep a `.0` suffix and exponents carry a sign and at least
/// two digits, e.g. `30.0`, `0.1`, `1.5e-05`, `1e+16`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| DEFAULTED.to_string(), format_float)
}

/// Generate the header line (without trailing newline).
fn generate_header(include_debt: bool) -> String {
    let mut header = format!("#{}", HEADER_COLUMNS.join(" "));
    if include_debt {
        header.push(' ');
        header.push_str(DEBT_COLUMN);
    }
    header
}

/// Generate one data row (without trailing newline).
fn generate_row(row: &ReportRow, include_debt: bool) -> String {
    let mut fields: Vec<String> = Vec::with_capacity(HEADER_COLUMNS.len() + 1);

    fields.push(row.second.to_string());
    fields.push(format_float(row.xput));
    fields.push(format_optional(row.avg_latency));

    for value in [
        row.insert.p50,
        row.insert.p99,
        row.generic.p50,
        row.generic.p99,
        row.init.avg,
        row.init.p50,
        row.init.p99,
        row.commit.avg,
        row.commit.p50,
        row.commit.p99,
    ] {
        fields.push(format_float(value));
    }

    let update = row.update;
    fields.push(format_optional(update.map(|u| u.avg)));
    fields.push(format_optional(update.map(|u| u.p50)));
    fields.push(format_optional(update.map(|u| u.p99)));

    let phases = row.generic_phases;
    fields.push(format_optional(phases.map(|p| p.p50.begin)));
    fields.push(format_optional(phases.map(|p| p.p50.commit)));
    fields.push(format_optional(phases.map(|p| p.p50.total)));
    fields.push(format_optional(phases.map(|p| p.p99.begin)));
    fields.push(format_optional(phases.map(|p| p.p99.commit)));
    fields.push(format_optional(phases.map(|p| p.p99.total)));

    if include_debt {
        fields.push(format_float(row.debt));
    }

    fields.join(" ")
}

/// Generate the complete text report.
pub fn generate_text_report(report: &Report, include_debt: bool) -> String {
    let mut output = generate_header(include_debt);
    output.push('\n');

    for row in &report.rows {
        output.push_str(&generate_row(row, include_debt));
        output.push('\n');
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Render the report in `format`.
pub fn render(report: &Report, format: OutputFormat, include_debt: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(generate_text_report(report, include_debt)),
        OutputFormat::Json => generate_json_report(report),
    }
}

/// Write the rendered report to `path`, replacing any existing file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush report to {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
