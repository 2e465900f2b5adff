use crate::error::AlignmentError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    Match,
    Ins,
    Del,
    /// Skipped reference region (`N`), i.e. an intron in a spliced alignment.
    Skip,
    SoftClip,
    HardClip,
    Pad,
    Equal,
    Diff,
}

impl CigarOp {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'M' => Some(Self::Match),
            b'I' => Some(Self::Ins),
            b'D' => Some(Self::Del),
            b'N' => Some(Self::Skip),
            b'S' => Some(Self::SoftClip),
            b'H' => Some(Self::HardClip),
            b'P' => Some(Self::Pad),
            b'=' => Some(Self::Equal),
            b'X' => Some(Self::Diff),
            _ => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Match => b'M',
            Self::Ins => b'I',
            Self::Del => b'D',
            Self::Skip => b'N',
            Self::SoftClip => b'S',
            Self::HardClip => b'H',
            Self::Pad => b'P',
            Self::Equal => b'=',
            Self::Diff => b'X',
        }
    }

    pub const fn consumes_ref(self) -> bool {
        matches!(self, Self::Match | Self::Del | Self::Skip | Self::Equal | Self::Diff)
    }

    /// Operations that place read bases on reference bases.
    pub const fn is_aligned(self) -> bool {
        matches!(self, Self::Match | Self::Equal | Self::Diff)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    pub ops: Vec<(u32, CigarOp)>,
}

impl Cigar {
    pub fn new(ops: Vec<(u32, CigarOp)>) -> Self {
        Self { ops }
    }

    pub fn push(&mut self, len: u32, op: CigarOp) {
        self.ops.push((len, op));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of reference bases spanned by the alignment (M/D/N/=/X).
    pub fn reference_len(&self) -> u64 {
        self.ops
            .iter()
            .filter(|(_, op)| op.consumes_ref())
            .map(|(len, _)| u64::from(*len))
            .sum()
    }

    /// True for exactly one `M` operation, i.e. an unspliced, unclipped alignment.
    pub fn is_single_match(&self) -> bool {
        matches!(self.ops.as_slice(), [(_, CigarOp::Match)])
    }

    pub fn has_skip(&self) -> bool {
        self.ops.iter().any(|(_, op)| *op == CigarOp::Skip)
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("*");
        }
        for (len, op) in &self.ops {
            write!(f, "{}{}", len, op.to_byte() as char)?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Cigar::default());
        }
        let mut cigar = Cigar::default();
        let mut len: Option<u32> = None;
        for b in s.bytes() {
            if b.is_ascii_digit() {
                let digit = u32::from(b - b'0');
                let next = len
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(|| AlignmentError::InvalidCigar(s.to_string()))?;
                len = Some(next);
            } else {
                let op = CigarOp::from_byte(b)
                    .ok_or_else(|| AlignmentError::InvalidCigar(s.to_string()))?;
                let n = len
                    .take()
                    .ok_or_else(|| AlignmentError::InvalidCigar(s.to_string()))?;
                cigar.push(n, op);
            }
        }
        if len.is_some() || cigar.is_empty() {
            return Err(AlignmentError::InvalidCigar(s.to_string()));
        }
        Ok(cigar)
    }
}
