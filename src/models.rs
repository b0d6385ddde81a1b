//! Data models for the xput aggregator.
//!
//! This module contains the per-thread input sample, the per-second running
//! sums and the normalized report rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Microseconds in one second.
pub const USEC_PER_SEC: f64 = 1_000_000.0;

/// Number of tokens in the shortest valid record.
pub const BASE_WIDTH: usize = 15;
/// Record width once the update-latency group is present.
pub const UPDATE_WIDTH: usize = 18;
/// Record width once the generic begin/commit/total group is present.
pub const PHASES_WIDTH: usize = 24;

/// Conversion from clock ticks to microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timebase {
    ticks_per_sec: f64,
}

impl Timebase {
    pub fn new(ticks_per_sec: f64) -> Self {
        Self { ticks_per_sec }
    }

    pub fn ticks_per_sec(&self) -> f64 {
        self.ticks_per_sec
    }

    /// Ticks in one microsecond.
    pub fn factor(&self) -> f64 {
        self.ticks_per_sec / USEC_PER_SEC
    }

    /// Convert a tick count into microseconds.
    pub fn to_usec(&self, ticks: f64) -> f64 {
        ticks / self.factor()
    }
}

/// 50th and 99th percentile pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Percentiles {
    pub p50: f64,
    pub p99: f64,
}

impl Percentiles {
    fn add(&mut self, other: &Percentiles) {
        self.p50 += other.p50;
        self.p99 += other.p99;
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            p50: f(self.p50),
            p99: f(self.p99),
        }
    }
}

/// Average plus 50th/99th percentiles of one operation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhaseStats {
    pub avg: f64,
    pub p50: f64,
    pub p99: f64,
}

impl PhaseStats {
    fn add(&mut self, other: &PhaseStats) {
        self.avg += other.avg;
        self.p50 += other.p50;
        self.p99 += other.p99;
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            avg: f(self.avg),
            p50: f(self.p50),
            p99: f(self.p99),
        }
    }
}

/// Begin/commit/total breakdown of generic operations at one percentile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub begin: f64,
    pub commit: f64,
    pub total: f64,
}

impl Breakdown {
    fn add(&mut self, other: &Breakdown) {
        self.begin += other.begin;
        self.commit += other.commit;
        self.total += other.total;
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            begin: f(self.begin),
            commit: f(self.commit),
            total: f(self.total),
        }
    }
}

/// p50 and p99 breakdowns of generic operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenericPhases {
    pub p50: Breakdown,
    pub p99: Breakdown,
}

impl GenericPhases {
    fn add(&mut self, other: &GenericPhases) {
        self.p50.add(&other.p50);
        self.p99.add(&other.p99);
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            p50: self.p50.map(&f),
            p99: self.p99.map(&f),
        }
    }
}

/// One input record: a single thread's measurements for one second.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub thread_id: f64,
    pub second: i64,
    pub num_ops: f64,
    pub latency_sum: f64,
    pub debt: f64,
    pub insert: Percentiles,
    pub generic: Percentiles,
    pub init: PhaseStats,
    pub commit: PhaseStats,
    /// Present on records with at least [`UPDATE_WIDTH`] fields.
    pub update: Option<PhaseStats>,
    /// Present on records with at least [`PHASES_WIDTH`] fields.
    pub generic_phases: Option<GenericPhases>,
}

impl Sample {
    /// Thread count implied by this sample's thread id.
    pub fn implied_thread_count(&self) -> u64 {
        let count = self.thread_id.floor() + 1.0;
        if count > 0.0 {
            count as u64
        } else {
            0
        }
    }
}

/// Running sums of every metric across all threads for one second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecondBucket {
    pub xput: f64,
    pub latency: f64,
    pub debt: f64,
    pub insert: Percentiles,
    pub generic: Percentiles,
    pub init: PhaseStats,
    pub commit: PhaseStats,
    pub update: PhaseStats,
    pub generic_phases: GenericPhases,
    /// Set once any record for this second carried the update group.
    pub has_update: bool,
    /// Set once any record for this second carried the generic phase group.
    pub has_generic_phases: bool,
}

impl SecondBucket {
    /// Add one sample's measurements to the running sums.
    pub fn add(&mut self, sample: &Sample) {
        self.xput += sample.num_ops;
        self.latency += sample.latency_sum;
        self.debt += sample.debt;
        self.insert.add(&sample.insert);
        self.generic.add(&sample.generic);
        self.init.add(&sample.init);
        self.commit.add(&sample.commit);

        if let Some(ref update) = sample.update {
            self.update.add(update);
            self.has_update = true;
        }
        if let Some(ref phases) = sample.generic_phases {
            self.generic_phases.add(phases);
            self.has_generic_phases = true;
        }
    }

    /// Normalize the sums into one report row.
    ///
    /// `thread_count` is the global count over the whole input, not the number
    /// of threads that reported this second.
    pub fn normalize(&self, second: i64, timebase: &Timebase, thread_count: u64) -> ReportRow {
        let threads = thread_count as f64;
        let per_thread = |sum: f64| timebase.to_usec(sum) / threads;

        let avg_latency = if self.xput > 0.0 {
            Some(timebase.to_usec(self.latency) / self.xput)
        } else {
            None
        };

        ReportRow {
            second,
            xput: self.xput,
            avg_latency,
            insert: self.insert.map(per_thread),
            generic: self.generic.map(per_thread),
            init: self.init.map(per_thread),
            commit: self.commit.map(per_thread),
            update: self.has_update.then(|| self.update.map(per_thread)),
            generic_phases: self
                .has_generic_phases
                .then(|| self.generic_phases.map(per_thread)),
            debt: per_thread(self.debt),
        }
    }
}

/// One normalized output row. Latencies are in microseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub second: i64,
    /// Raw operation count summed across threads.
    pub xput: f64,
    /// `None` when no operation completed in this second.
    pub avg_latency: Option<f64>,
    pub insert: Percentiles,
    pub generic: Percentiles,
    pub init: PhaseStats,
    pub commit: PhaseStats,
    pub update: Option<PhaseStats>,
    pub generic_phases: Option<GenericPhases>,
    pub debt: f64,
}

/// Metadata about one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the xput log that was aggregated.
    pub input: String,
    pub ticks_per_sec: f64,
    /// Ticks per microsecond.
    pub timebase_factor: f64,
    pub thread_count: u64,
    pub records_read: usize,
    pub seconds_reported: usize,
}

/// The complete per-second report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub rows: Vec<ReportRow>,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Space-separated columns with a `#` header (default)
    #[default]
    Text,
    /// Pretty-printed JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
