//! Constitutive exon selection.
//!
//! An exon is constitutive when it appears, with identical coordinates and strand, in every
//! transcript of its gene. Candidates always come from the gene's first transcript.

use crate::annotation::{Exon, Gene, Transcript};

#[derive(Debug, Clone)]
pub struct ConstExonConfig {
    /// Exons shorter than this (in bp, inclusive length) are never selected.
    pub min_exon_size: u64,
    /// Skip the membership test and keep every sufficiently long exon of the first transcript.
    pub all_constitutive: bool,
}

impl ConstExonConfig {
    /// Parameters for exporting a constitutive-exon annotation.
    pub fn export() -> Self {
        Self {
            min_exon_size: 20,
            all_constitutive: false,
        }
    }

    /// Parameters for insert-length estimation: the input is already a constitutive-exon
    /// annotation, so only the (much larger) size filter applies.
    pub fn insert_len() -> Self {
        Self {
            min_exon_size: 500,
            all_constitutive: true,
        }
    }
}

impl Default for ConstExonConfig {
    fn default() -> Self {
        Self::export()
    }
}

/// Select the constitutive exons of one gene.
///
/// Returns the surviving exons of `transcripts[0]` in annotation order, each tagged
/// with `gene_id` as its parent. An empty transcript list or an exon-less first transcript
/// yields an empty result.
pub fn select_constitutive(
    gene_id: &str,
    transcripts: &[Transcript],
    min_size: u64,
    treat_all_as_constitutive: bool,
) -> Vec<Exon> {
    let Some((first, others)) = transcripts.split_first() else {
        return Vec::new();
    };

    first
        .exons
        .iter()
        .filter(|exon| exon.length() >= min_size)
        .filter(|exon| treat_all_as_constitutive || others.iter().all(|tx| tx.contains_exon(exon)))
        .map(|exon| Exon {
            gene_parent: Some(gene_id.to_string()),
            ..exon.clone()
        })
        .collect()
}

/// Run [`select_constitutive`] over many genes and concatenate the results in gene order.
pub fn constitutive_exons_by_gene(genes: &[Gene], config: &ConstExonConfig) -> Vec<Exon> {
    let mut out = Vec::new();
    for gene in genes {
        let exons = select_constitutive(
            &gene.id,
            &gene.transcripts,
            config.min_exon_size,
            config.all_constitutive,
        );
        if exons.is_empty() {
            tracing::debug!(gene = %gene.id, "no constitutive exons");
        }
        out.extend(exons);
    }
    tracing::info!(
        genes = genes.len(),
        exons = out.len(),
        min_exon_size = config.min_exon_size,
        all_constitutive = config.all_constitutive,
        "selected constitutive exons"
    );
    out
}
