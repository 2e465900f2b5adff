//! splicecov-rs: coverage, splice junctions and paired-end insert lengths from RNA-seq
//! alignments.
//!
//! # Library usage
//!
//! ```no_run
//! use splicecov_rs::annotation::load_genes;
//! use splicecov_rs::{AlignedRead, extract, select_constitutive};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let genes = load_genes(Path::new("genes.gtf"))?;
//! let gene = &genes[0];
//! let exons = select_constitutive(&gene.id, &gene.transcripts, 20, false);
//!
//! let reads = vec![AlignedRead::new("r1", 1000, "20M100N30M".parse()?)];
//! if let Some(locus) = gene.locus() {
//!     let result = extract(&reads, locus.start, locus.end)?;
//!     println!("{} exons, {} junctions", exons.len(), result.junctions.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod annotation;
pub mod cigar;
pub mod constitutive;
pub mod coverage;
pub mod error;
pub mod insert_len;
pub mod interval;
pub mod output;
pub mod pairing;
pub mod tagging;
pub mod types;

// Flat re-exports for the most commonly used public types.
pub use alignment::{AlignedRead, Mate, ReadShape};
pub use annotation::{Exon, Gene, GeneLocus, Transcript};
pub use cigar::{Cigar, CigarOp};
pub use constitutive::{ConstExonConfig, constitutive_exons_by_gene, select_constitutive};
pub use coverage::{
    CoverageConfig, CoverageTrack, Extraction, Junction, JunctionTable, MalformedRead, extract,
};
pub use error::{AlignmentError, InsertLenError, IntervalParseError, LocusError};
pub use insert_len::{InsertLenEstimate, IntervalInsertSamples, MatePair, TaggedMate, estimate};
pub use interval::{IntervalId, parse_tagged_intervals};
pub use pairing::{Pairing, pair_mates};
pub use tagging::IntervalIndex;
pub use types::{Pos, Strand};
