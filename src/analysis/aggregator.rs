//! Per-second aggregation of xput samples.
//!
//! This module sums per-thread samples into one bucket per second and
//! normalizes the buckets into report rows.

use crate::analysis::parser::parse_line;
use crate::error::RecordError;
use crate::models::{ReportRow, Sample, SecondBucket, Timebase};
use anyhow::{ensure, Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Accumulates samples into per-second buckets.
#[derive(Debug, Default)]
pub struct Aggregator {
    buckets: BTreeMap<i64, SecondBucket>,
    thread_count: u64,
    records: usize,
    strict_width: bool,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new(strict_width: bool) -> Self {
        Self {
            strict_width,
            ..Self::default()
        }
    }

    /// Add a parsed sample to its second's bucket.
    pub fn add_sample(&mut self, sample: &Sample) {
        self.thread_count = self.thread_count.max(sample.implied_thread_count());
        self.buckets.entry(sample.second).or_default().add(sample);
        self.records += 1;
    }

    /// Parse one line and add it. Blank lines are ignored.
    pub fn add_line(&mut self, line_no: usize, line: &str) -> Result<(), RecordError> {
        if let Some(sample) = parse_line(line_no, line, self.strict_width)? {
            self.add_sample(&sample);
        }
        Ok(())
    }

    /// Consume every line of `reader`.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", idx + 1))?;
            self.add_line(idx + 1, &line)?;
        }
        Ok(())
    }

    /// Consume an xput log file.
    pub fn read_file(&mut self, path: &Path) -> Result<()> {
        info!("Reading samples from: {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        self.read_from(BufReader::new(file))
            .with_context(|| format!("Failed to aggregate {}", path.display()))?;

        debug!(
            "Read {} records covering {} seconds from {} threads",
            self.records(),
            self.seconds(),
            self.thread_count()
        );
        Ok(())
    }

    /// Global thread count: highest thread id seen plus one.
    pub fn thread_count(&self) -> u64 {
        self.thread_count
    }

    /// Number of records added so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Number of distinct seconds seen so far.
    pub fn seconds(&self) -> usize {
        self.buckets.len()
    }

    /// Raw sums for one second.
    #[allow(dead_code)] // Inspection helper, used by tests
    pub fn bucket(&self, second: i64) -> Option<&SecondBucket> {
        self.buckets.get(&second)
    }

    /// Normalize every bucket, in ascending order of second.
    ///
    /// Fails when samples were read but none had a non-negative thread id,
    /// since the per-thread columns would divide by zero.
    pub fn rows(&self, timebase: &Timebase) -> Result<Vec<ReportRow>> {
        ensure!(
            self.buckets.is_empty() || self.thread_count > 0,
            "Cannot average {} records over 0 threads: no thread id is >= 0",
            self.records
        );

        Ok(self
            .buckets
            .iter()
            .map(|(second, bucket)| bucket.normalize(*second, timebase, self.thread_count))
            .collect())
    }
}
