use anyhow::{Context, Result};
use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;
use noodles::sam::alignment::record::data::field::{Tag, Value};
use splicecov_rs::{AlignedRead, Cigar, CigarOp, Mate, Pos, Strand};
use std::path::Path;

/// Tag written by `bedtools tagBam -intervals`.
const INTERVALS_TAG: Tag = Tag::new(b'Y', b'B');

#[derive(Debug, Default)]
pub struct BamStats {
    pub total_reads: u64,
    pub unmapped_reads: u64,
    /// Secondary, supplementary, or lacking a reference/position.
    pub skipped_reads: u64,
    /// Mapped records without a read name; they cannot be paired.
    pub unnamed_reads: u64,
}

/// A primary mapped record converted for the core.
#[derive(Debug)]
pub struct BamAlignment {
    pub chrom: String,
    pub read: AlignedRead,
    /// Raw `YB` interval tag, if the BAM was produced by `tagBam`.
    pub intervals_tag: Option<String>,
}

/// Stream every primary mapped record of a BAM file through `f`.
pub fn read_alignments<F>(path: &Path, mut f: F) -> Result<BamStats>
where
    F: FnMut(BamAlignment) -> Result<()>,
{
    let mut reader = bam::io::reader::Builder
        .build_from_path(path)
        .with_context(|| format!("opening BAM {}", path.display()))?;
    let header = reader.read_header()?;
    let refnames: Vec<String> = header
        .reference_sequences()
        .keys()
        .map(|name| name.to_string())
        .collect();

    let mut stats = BamStats::default();

    for result in reader.records() {
        let record = result?;
        stats.total_reads += 1;

        let flags = record.flags();
        if flags.is_unmapped() {
            stats.unmapped_reads += 1;
            continue;
        }
        if flags.is_secondary() || flags.is_supplementary() {
            stats.skipped_reads += 1;
            continue;
        }

        let chrom = match record.reference_sequence_id() {
            Some(Ok(id)) => refnames.get(id).cloned(),
            Some(Err(_)) | None => None,
        };
        let start = record
            .alignment_start()
            .and_then(|res| res.ok())
            .map(|pos| (pos.get() - 1) as Pos);
        let (Some(chrom), Some(start)) = (chrom, start) else {
            stats.skipped_reads += 1;
            continue;
        };

        let Some(name) = record.name().map(|n| n.to_string()) else {
            stats.unnamed_reads += 1;
            continue;
        };

        let mut cigar = Cigar::default();
        for op in record.cigar().iter() {
            let op = op?;
            cigar.push(op.len() as u32, kind_to_op(op.kind()));
        }

        let mate = if !flags.is_segmented() {
            Mate::Single
        } else if flags.is_first_segment() {
            Mate::First
        } else if flags.is_last_segment() {
            Mate::Second
        } else {
            Mate::Single
        };
        let strand = if flags.is_reverse_complemented() {
            Strand::Reverse
        } else {
            Strand::Forward
        };

        let read = AlignedRead::new(name, start, cigar)
            .with_mate(mate)
            .with_strand(strand);

        f(BamAlignment {
            chrom,
            read,
            intervals_tag: get_string_tag(&record, INTERVALS_TAG),
        })?;
    }

    Ok(stats)
}

fn kind_to_op(kind: CigarKind) -> CigarOp {
    match kind {
        CigarKind::Match => CigarOp::Match,
        CigarKind::Insertion => CigarOp::Ins,
        CigarKind::Deletion => CigarOp::Del,
        CigarKind::Skip => CigarOp::Skip,
        CigarKind::SoftClip => CigarOp::SoftClip,
        CigarKind::HardClip => CigarOp::HardClip,
        CigarKind::Pad => CigarOp::Pad,
        CigarKind::SequenceMatch => CigarOp::Equal,
        CigarKind::SequenceMismatch => CigarOp::Diff,
    }
}

fn get_string_tag(record: &bam::Record, tag: Tag) -> Option<String> {
    let data = record.data();
    let value = data.get(&tag)?;
    match value.ok()? {
        Value::String(s) => Some(s.to_string()),
        _ => None,
    }
}
