//! Record-level errors raised while parsing the xput log.

use thiserror::Error;

/// Error for a single malformed input record.
///
/// Line numbers are 1-indexed, column indices are 0-indexed token positions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("line {line}: expected at least {expected} fields, found {found}")]
    ShortRecord {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: field {column} is not a number: {token:?}")]
    InvalidNumber {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("line {line}: incomplete {group} group, expected {expected} fields, found {found}")]
    IncompleteGroup {
        line: usize,
        group: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unexpected record width {found} (expected 15, 18 or 24 fields)")]
    UnexpectedWidth { line: usize, found: usize },
}
