//! Parsing of xput log records.
//!
//! Each line holds one thread's measurements for one second:
//!
//! ```text
//! thread second ops latency debt p50_ins p99_ins p50_gen p99_gen
//!   avg_init p50_init p99_init avg_commit p50_commit p99_commit
//!   [avg_upd p50_upd p99_upd]
//!   [p50_begin p50_commit p50_total p99_begin p99_commit p99_total]
//! ```

use crate::error::RecordError;
use crate::models::{
    Breakdown, GenericPhases, Percentiles, PhaseStats, Sample, BASE_WIDTH, PHASES_WIDTH,
    UPDATE_WIDTH,
};

/// Tokens of one record, with the line number kept for error reporting.
struct Fields<'a> {
    line: usize,
    tokens: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn number(&self, column: usize) -> Result<f64, RecordError> {
        let token = self.tokens[column];
        token
            .parse::<f64>()
            .map_err(|_| RecordError::InvalidNumber {
                line: self.line,
                column,
                token: token.to_string(),
            })
    }

    /// Parse the second column, truncating any fractional part toward zero.
    /// Non-finite and out-of-range values are rejected.
    fn second(&self, column: usize) -> Result<i64, RecordError> {
        let token = self.tokens[column];
        if let Ok(second) = token.parse::<i64>() {
            return Ok(second);
        }
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        let in_range = |v: f64| v >= i64::MIN as f64 && v < i64::MAX as f64;
        match token.parse::<f64>().map(f64::trunc) {
            Ok(value) if in_range(value) => Ok(value as i64),
            _ => Err(RecordError::InvalidNumber {
                line: self.line,
                column,
                token: token.to_string(),
            }),
        }
    }

    fn percentiles(&self, start: usize) -> Result<Percentiles, RecordError> {
        Ok(Percentiles {
            p50: self.number(start)?,
            p99: self.number(start + 1)?,
        })
    }

    fn phase(&self, start: usize) -> Result<PhaseStats, RecordError> {
        Ok(PhaseStats {
            avg: self.number(start)?,
            p50: self.number(start + 1)?,
            p99: self.number(start + 2)?,
        })
    }

    fn breakdown(&self, start: usize) -> Result<Breakdown, RecordError> {
        Ok(Breakdown {
            begin: self.number(start)?,
            commit: self.number(start + 1)?,
            total: self.number(start + 2)?,
        })
    }
}

/// Parse one line of the xput log.
///
/// Returns `Ok(None)` for blank lines. A record whose width falls inside an
/// optional group is rejected. With `strict_width` set, only the three known
/// record widths are accepted.
pub fn parse_line(
    line_no: usize,
    line: &str,
    strict_width: bool,
) -> Result<Option<Sample>, RecordError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }

    let width = tokens.len();
    if width < BASE_WIDTH {
        return Err(RecordError::ShortRecord {
            line: line_no,
            expected: BASE_WIDTH,
            found: width,
        });
    }
    if strict_width && !matches!(width, BASE_WIDTH | UPDATE_WIDTH | PHASES_WIDTH) {
        return Err(RecordError::UnexpectedWidth {
            line: line_no,
            found: width,
        });
    }
    let incomplete = match width {
        w if w > BASE_WIDTH && w < UPDATE_WIDTH => Some(("update", UPDATE_WIDTH)),
        w if w > UPDATE_WIDTH && w < PHASES_WIDTH => Some(("generic phase", PHASES_WIDTH)),
        _ => None,
    };
    if let Some((group, expected)) = incomplete {
        return Err(RecordError::IncompleteGroup {
            line: line_no,
            group,
            expected,
            found: width,
        });
    }

    let fields = Fields {
        line: line_no,
        tokens,
    };

    Ok(Some(Sample {
        thread_id: fields.number(0)?,
        second: fields.second(1)?,
        num_ops: fields.number(2)?,
        latency_sum: fields.number(3)?,
        debt: fields.number(4)?,
        insert: fields.percentiles(5)?,
        generic: fields.percentiles(7)?,
        init: fields.phase(9)?,
        commit: fields.phase(12)?,
        update: if width >= UPDATE_WIDTH {
            Some(fields.phase(15)?)
        } else {
            None
        },
        generic_phases: if width >= PHASES_WIDTH {
            Some(GenericPhases {
                p50: fields.breakdown(18)?,
                p99: fields.breakdown(21)?,
            })
        } else {
            None
        },
    }))
}
