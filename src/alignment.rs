use crate::cigar::{Cigar, CigarOp};
use crate::error::AlignmentError;
use crate::types::{Pos, Strand};

/// Which segment of a template a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mate {
    #[default]
    Single,
    First,
    Second,
}

/// An aligned read as consumed by the extractor and the insert-length estimator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    pub name: String,
    /// 0-based leftmost reference position.
    pub start: Pos,
    pub cigar: Cigar,
    pub mate: Mate,
    pub strand: Strand,
}

impl AlignedRead {
    pub fn new(name: impl Into<String>, start: Pos, cigar: Cigar) -> Self {
        Self {
            name: name.into(),
            start,
            cigar,
            mate: Mate::Single,
            strand: Strand::Unknown,
        }
    }

    pub fn with_mate(mut self, mate: Mate) -> Self {
        self.mate = mate;
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Position just past the last reference base covered (0-based, exclusive).
    pub fn reference_end(&self) -> Pos {
        self.start + self.cigar.reference_len()
    }

    /// Reference footprint as a 0-based, half-open `[start, end)` pair.
    pub fn reference_span(&self) -> (Pos, Pos) {
        (self.start, self.reference_end())
    }

    pub fn shape(&self) -> Result<ReadShape, AlignmentError> {
        ReadShape::decode(&self.cigar)
    }
}

/// Genomic footprint of a read that the extractor knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadShape {
    /// A single ungapped aligned block.
    Contiguous { len: u32 },
    /// `left` aligned bases, a `gap`-long intron, `right` aligned bases.
    Spliced { left: u32, gap: u32, right: u32 },
}

impl ReadShape {
    /// Decode a CIGAR into one of the supported shapes.
    ///
    /// Anything other than `<n>M` or `<n>M<n>N<n>M` (with `=`/`X` accepted in place of `M`)
    /// is rejected, including clipped and multi-intron alignments.
    pub fn decode(cigar: &Cigar) -> Result<Self, AlignmentError> {
        let shape = match cigar.ops.as_slice() {
            [] => return Err(AlignmentError::EmptyCigar),
            [(len, op)] if op.is_aligned() => ReadShape::Contiguous { len: *len },
            [(left, l_op), (gap, CigarOp::Skip), (right, r_op)]
                if l_op.is_aligned() && r_op.is_aligned() =>
            {
                ReadShape::Spliced { left: *left, gap: *gap, right: *right }
            }
            _ => return Err(AlignmentError::UnsupportedShape(cigar.to_string())),
        };

        let empty = match shape {
            ReadShape::Contiguous { len } => len == 0,
            ReadShape::Spliced { left, right, .. } => left == 0 || right == 0,
        };
        if empty {
            return Err(AlignmentError::EmptyBlock(cigar.to_string()));
        }
        Ok(shape)
    }

    /// Number of aligned bases, excluding any skipped intron.
    pub fn aligned_len(self) -> u64 {
        match self {
            ReadShape::Contiguous { len } => u64::from(len),
            ReadShape::Spliced { left, right, .. } => u64::from(left) + u64::from(right),
        }
    }
}
