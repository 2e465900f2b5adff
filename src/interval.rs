use crate::error::IntervalParseError;
use crate::types::{Pos, Strand};
use std::fmt;
use std::str::FromStr;

/// An annotated genomic interval, 1-based inclusive.
///
/// The string form `chrom:start-end:strand` is only produced and consumed at
/// serialization boundaries; everything else passes the structured value around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId {
    pub chrom: String,
    pub start: Pos,
    pub end: Pos,
    pub strand: Strand,
}

impl IntervalId {
    pub fn new(
        chrom: impl Into<String>,
        start: Pos,
        end: Pos,
        strand: Strand,
    ) -> Result<Self, IntervalParseError> {
        if end < start {
            return Err(IntervalParseError::Inverted { start, end });
        }
        Ok(Self { chrom: chrom.into(), start, end, strand })
    }

    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.chrom, self.start, self.end, self.strand)
    }
}

impl FromStr for IntervalId {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IntervalParseError::InvalidInterval(s.to_string());
        let (rest, strand) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (chrom, coords) = rest.rsplit_once(':').ok_or_else(invalid)?;
        let (start, end) = coords.split_once('-').ok_or_else(invalid)?;
        if chrom.is_empty() {
            return Err(invalid());
        }
        IntervalId::new(chrom, parse_coord(start)?, parse_coord(end)?, strand.parse()?)
    }
}

fn parse_coord(s: &str) -> Result<Pos, IntervalParseError> {
    s.trim()
        .parse::<Pos>()
        .map_err(|_| IntervalParseError::InvalidCoordinate(s.to_string()))
}

/// Parse the interval list that bedtools `tagBam -intervals` embeds in a record tag.
///
/// Each entry looks like `<label>:<chrom>:<start>-<end>,<name>,<score>,<strand>` with a
/// 0-based start; the returned intervals are shifted to 1-based starts.
pub fn parse_tagged_intervals(tag: &str, label: &str) -> Result<Vec<IntervalId>, IntervalParseError> {
    let prefix = format!("{label}:");
    let mut intervals = Vec::new();

    for region in tag.split(prefix.as_str()).skip(1) {
        let fields: Vec<&str> = region.split(',').collect();
        let invalid = || IntervalParseError::InvalidInterval(region.to_string());
        let (chrom, coords) = fields[0].rsplit_once(':').ok_or_else(invalid)?;
        let (start, end) = coords.split_once('-').ok_or_else(invalid)?;
        let strand = fields
            .get(3)
            .map(|s| s.trim().trim_end_matches(';'))
            .ok_or_else(invalid)?;

        let start = parse_coord(start)? + 1;
        intervals.push(IntervalId::new(chrom, start, parse_coord(end)?, strand.parse()?)?);
    }

    Ok(intervals)
}
