use crate::error::IntervalParseError;
use std::fmt;
use std::str::FromStr;

/// Genomic position. Reads use 0-based starts, annotation uses 1-based inclusive coordinates;
/// each type documents which convention it follows.
pub type Pos = u64;

// Fast hash maps using AHash instead of the default SipHash.
// Also import `HashMapExt` when you need `::new()` or `::with_capacity()`.
pub type HashMap<K, V> = ahash::HashMap<K, V>;
pub use ahash::HashMapExt;

/// Strand of a feature or alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Strand {
    type Error = IntervalParseError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Strand::Forward),
            '-' => Ok(Strand::Reverse),
            '.' | '?' => Ok(Strand::Unknown),
            other => Err(IntervalParseError::InvalidStrand(other.to_string())),
        }
    }
}

impl FromStr for Strand {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Strand::try_from(c),
            _ => Err(IntervalParseError::InvalidStrand(s.to_string())),
        }
    }
}
