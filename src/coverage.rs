//! Per-base coverage and splice-junction extraction over a single locus window.

use crate::alignment::{AlignedRead, ReadShape};
use crate::annotation::Transcript;
use crate::error::{AlignmentError, LocusError};
use crate::types::Pos;
use std::collections::BTreeMap;
use std::fmt;

/// Dense coverage values for `[locus_start, locus_end]`, index 0 being `locus_start`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTrack {
    values: Vec<f64>,
}

impl CoverageTrack {
    pub fn new(len: usize) -> Self {
        Self { values: vec![0.0; len] }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Add `weight` to every base of `[offset, offset + len)` that lies inside the track.
    fn add_block(&mut self, offset: i64, len: u64, weight: f64) {
        let n = self.values.len() as i64;
        let s = offset.max(0);
        let e = offset.saturating_add(len as i64).min(n);
        if s >= e {
            return;
        }
        for v in &mut self.values[s as usize..e as usize] {
            *v += weight;
        }
    }

    /// Per-library scaling: `1e3 * value / coverage`.
    pub fn normalized(&self, coverage: f64) -> Vec<f64> {
        self.values.iter().map(|v| 1e3 * v / coverage).collect()
    }

    /// `log10(value + 1)` for every base.
    pub fn log10p(&self) -> Vec<f64> {
        self.values.iter().map(|v| (v + 1.0).log10()).collect()
    }
}

/// Splice junction in 1-based genomic coordinates: last exonic base before the intron and
/// first exonic base after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Junction {
    pub donor: Pos,
    pub acceptor: Pos,
}

impl Junction {
    pub fn new(donor: Pos, acceptor: Pos) -> Self {
        Self { donor, acceptor }
    }

    /// Number of transcripts that have exon boundaries at both splice sites.
    pub fn isoform_support(&self, transcripts: &[Transcript]) -> usize {
        transcripts
            .iter()
            .filter(|tx| tx.has_exon_boundary(self.donor) && tx.has_exon_boundary(self.acceptor))
            .count()
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.donor, self.acceptor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JunctionTable {
    counts: BTreeMap<Junction, u32>,
}

impl JunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, junction: Junction) {
        *self.counts.entry(junction).or_insert(0) += 1;
    }

    /// Observed read count, 0 for a junction never seen.
    pub fn get(&self, junction: &Junction) -> u32 {
        self.counts.get(junction).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Junctions in ascending `(donor, acceptor)` order.
    pub fn iter(&self) -> impl Iterator<Item = (Junction, u32)> + '_ {
        self.counts.iter().map(|(j, c)| (*j, *c))
    }
}

/// A read the extractor could not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRead {
    /// Position of the read in the input sequence.
    pub index: usize,
    pub name: String,
    pub error: AlignmentError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub coverage: CoverageTrack,
    pub junctions: JunctionTable,
    pub malformed: Vec<MalformedRead>,
}

impl Extraction {
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }
}

/// How a coverage track is turned into plotted values.
#[derive(Debug, Clone, Default)]
pub struct CoverageConfig {
    /// Library coverage used for `1e3 * value / coverage` scaling; unscaled when `None`.
    pub scale: Option<f64>,
    /// Apply `log10(value + 1)` after scaling.
    pub logged: bool,
}

impl CoverageConfig {
    pub fn apply(&self, track: &CoverageTrack) -> Vec<f64> {
        let scaled = match self.scale {
            Some(coverage) => track.normalized(coverage),
            None => track.values().to_vec(),
        };
        if self.logged {
            scaled.into_iter().map(|v| (v + 1.0).log10()).collect()
        } else {
            scaled
        }
    }
}

/// Accumulate coverage and junctions of `reads` over `[locus_start, locus_end]`.
///
/// Read starts are 0-based and the track index of a 0-based position `p` is
/// `p - locus_start`, so index `i` is 1-based position `locus_start + i + 1`.
/// Each read spreads a total weight of 1 over its aligned bases before clipping to the
/// locus. A spliced read records its junction only if both splice sites fall inside the
/// track. Reads whose CIGAR is neither `<n>M` nor `<n>M<n>N<n>M` are skipped and reported
/// in [`Extraction::malformed`].
pub fn extract<'a, I>(reads: I, locus_start: Pos, locus_end: Pos) -> Result<Extraction, LocusError>
where
    I: IntoIterator<Item = &'a AlignedRead>,
{
    if locus_end < locus_start {
        return Err(LocusError::Inverted {
            start: locus_start,
            end: locus_end,
        });
    }
    let track_len = (locus_end - locus_start + 1) as usize;
    let mut coverage = CoverageTrack::new(track_len);
    let mut junctions = JunctionTable::new();
    let mut malformed = Vec::new();

    let origin = locus_start as i64;
    let in_track = |pos: Pos| {
        let off = pos as i64 - origin;
        off >= 0 && off < track_len as i64
    };

    for (index, read) in reads.into_iter().enumerate() {
        let shape = match read.shape() {
            Ok(shape) => shape,
            Err(error) => {
                tracing::debug!(read = %read.name, cigar = %read.cigar, %error, "skipping read");
                malformed.push(MalformedRead {
                    index,
                    name: read.name.clone(),
                    error,
                });
                continue;
            }
        };

        let weight = 1.0 / shape.aligned_len() as f64;
        let offset = read.start as i64 - origin;

        match shape {
            ReadShape::Contiguous { len } => {
                coverage.add_block(offset, u64::from(len), weight);
            }
            ReadShape::Spliced { left, gap, right } => {
                let right_offset = offset + i64::from(left) + i64::from(gap);
                coverage.add_block(offset, u64::from(left), weight);
                coverage.add_block(right_offset, u64::from(right), weight);

                let donor = read.start + u64::from(left);
                let acceptor = donor + u64::from(gap) + 1;
                if in_track(donor) && in_track(acceptor) {
                    junctions.record(Junction::new(donor, acceptor));
                }
            }
        }
    }

    if !malformed.is_empty() {
        tracing::warn!(
            locus_start,
            locus_end,
            malformed = malformed.len(),
            "reads with unsupported CIGARs were skipped"
        );
    }

    Ok(Extraction {
        coverage,
        junctions,
        malformed,
    })
}
