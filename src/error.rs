//! Error types for the core library.
//!
//! Per-record problems ([`AlignmentError`]) are collected next to the results that
//! survive them. [`InsertLenError`] aborts the whole estimation call.

use crate::interval::IntervalId;
use crate::types::Pos;
use thiserror::Error;

/// A CIGAR that cannot be parsed or does not decode into a supported block shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("invalid CIGAR string: {0:?}")]
    InvalidCigar(String),
    #[error("empty CIGAR")]
    EmptyCigar,
    #[error("zero-length aligned block in CIGAR {0}")]
    EmptyBlock(String),
    #[error("unsupported CIGAR shape {0}: expected <n>M or <n>M<n>N<n>M")]
    UnsupportedShape(String),
}

/// A fully validated mate pair produced a fragment length that cannot be right.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertLenError {
    #[error("0 or negative insert length {length} detected in region {interval}")]
    NonPositive { interval: IntervalId, length: i64 },
}

/// Failure to parse an interval identifier, a strand or a tagged interval list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalParseError {
    #[error("invalid strand {0:?}")]
    InvalidStrand(String),
    #[error("invalid interval {0:?}: expected chrom:start-end:strand")]
    InvalidInterval(String),
    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
    #[error("interval end {end} precedes start {start}")]
    Inverted { start: Pos, end: Pos },
}

/// A locus window whose bounds cannot form a coverage track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocusError {
    #[error("locus end {end} precedes start {start}")]
    Inverted { start: Pos, end: Pos },
}
