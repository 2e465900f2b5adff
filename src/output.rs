//! Tabular and GFF3 writers for the values produced by the core.

use crate::annotation::{Exon, Transcript};
use crate::coverage::JunctionTable;
use crate::insert_len::IntervalInsertSamples;
use crate::types::Pos;
use std::io::{self, Write};

const GFF_SOURCE: &str = "const_exons";

/// `#region\tinsert_len` followed by one `region\tlen,len,...` row per interval.
pub fn write_insert_len_table<W: Write>(samples: &IntervalInsertSamples, out: &mut W) -> io::Result<()> {
    writeln!(out, "#region\tinsert_len")?;
    for (region, lens) in samples {
        let lens: Vec<String> = lens.iter().map(|l| l.to_string()).collect();
        writeln!(out, "{}\t{}", region, lens.join(","))?;
    }
    Ok(())
}

/// Write constitutive exons as GFF3 `exon` features.
///
/// Each exon gets its interval string as `ID` and its gene as both `Parent` and
/// `GeneParent`, so reading the file back yields one transcript per gene holding exactly
/// these exons.
pub fn write_const_exons_gff<W: Write>(exons: &[Exon], out: &mut W) -> io::Result<()> {
    writeln!(out, "##gff-version 3")?;
    for exon in exons {
        let mut attrs = format!("ID={}", exon.interval_id());
        if let Some(gene) = &exon.gene_parent {
            attrs.push_str(&format!(";Parent={gene};GeneParent={gene}"));
        }
        writeln!(
            out,
            "{}\t{}\texon\t{}\t{}\t.\t{}\t.\t{}",
            exon.chrom, GFF_SOURCE, exon.start, exon.end, exon.strand, attrs
        )?;
    }
    Ok(())
}

/// `#position\tcoverage` with 1-based positions.
///
/// Track index `i` holds the base at 0-based offset `locus_start + i` (see
/// [`crate::coverage::extract`]), which is 1-based position `locus_start + i + 1`, the same
/// convention as the junction table's donor and acceptor.
pub fn write_coverage_track<W: Write>(locus_start: Pos, values: &[f64], out: &mut W) -> io::Result<()> {
    writeln!(out, "#position\tcoverage")?;
    for (i, v) in values.iter().enumerate() {
        writeln!(out, "{}\t{}", locus_start + i as Pos + 1, v)?;
    }
    Ok(())
}

/// `#donor\tacceptor\tcount\tisoforms`, where `isoforms` counts the transcripts that have
/// exon boundaries at both splice sites.
pub fn write_junction_table<W: Write>(
    junctions: &JunctionTable,
    transcripts: &[Transcript],
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "#donor\tacceptor\tcount\tisoforms")?;
    for (junction, count) in junctions.iter() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            junction.donor,
            junction.acceptor,
            count,
            junction.isoform_support(transcripts)
        )?;
    }
    Ok(())
}
