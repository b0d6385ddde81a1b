//! Analysis modules.
//!
//! Parsing of xput log records and their per-second aggregation.

pub mod aggregator;
pub mod parser;

pub use aggregator::Aggregator;
