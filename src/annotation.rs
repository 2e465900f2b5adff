use crate::interval::IntervalId;
use crate::types::{HashMap, HashMapExt, Pos, Strand};
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Gtf,
    Gff3,
}

/// Transcription unit of a gene, 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneLocus {
    pub chrom: String,
    pub start: Pos,
    pub end: Pos,
    pub strand: Strand,
}

impl GeneLocus {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Exon coordinates are 1-based inclusive, as in GTF/GFF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    pub chrom: String,
    pub start: Pos,
    pub end: Pos,
    pub strand: Strand,
    /// Owning gene, set once the exon has been classified constitutive.
    pub gene_parent: Option<String>,
}

impl Exon {
    pub fn new(chrom: impl Into<String>, start: Pos, end: Pos, strand: Strand) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            strand,
            gene_parent: None,
        }
    }

    pub fn length(&self) -> u64 {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Identity used for constitutive membership: coordinates and strand only.
    pub fn same_coordinates(&self, other: &Exon) -> bool {
        self.start == other.start && self.end == other.end && self.strand == other.strand
    }

    pub fn interval_id(&self) -> IntervalId {
        IntervalId {
            chrom: self.chrom.clone(),
            start: self.start,
            end: self.end,
            strand: self.strand,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub id: String,
    pub chrom: String,
    pub strand: Strand,
    /// Sorted by genomic start regardless of strand.
    pub exons: Vec<Exon>,
}

impl Transcript {
    pub fn new(id: impl Into<String>, chrom: impl Into<String>, strand: Strand) -> Self {
        Self {
            id: id.into(),
            chrom: chrom.into(),
            strand,
            exons: Vec::new(),
        }
    }

    /// Build a transcript from `(start, end)` exon pairs sharing the transcript's strand.
    pub fn from_exons(
        id: impl Into<String>,
        chrom: impl Into<String>,
        strand: Strand,
        exons: &[(Pos, Pos)],
    ) -> Self {
        let mut tx = Transcript::new(id, chrom, strand);
        for &(start, end) in exons {
            tx.exons.push(Exon::new(tx.chrom.clone(), start, end, strand));
        }
        tx.exons.sort_by_key(|e| (e.start, e.end));
        tx
    }

    pub fn contains_exon(&self, exon: &Exon) -> bool {
        self.exons.iter().any(|e| e.same_coordinates(exon))
    }

    /// True if `pos` is the start or end coordinate of any exon.
    pub fn has_exon_boundary(&self, pos: Pos) -> bool {
        self.exons.iter().any(|e| e.start == pos || e.end == pos)
    }

    pub fn span(&self) -> Option<(Pos, Pos)> {
        let first = self.exons.first()?;
        let last = self.exons.last()?;
        Some((first.start, last.end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub id: String,
    /// In annotation order; the first transcript defines constitutive candidates.
    pub transcripts: Vec<Transcript>,
}

impl Gene {
    pub fn new(id: impl Into<String>, transcripts: Vec<Transcript>) -> Self {
        Self { id: id.into(), transcripts }
    }

    /// Span of all exons of all transcripts, or `None` for a gene without exons.
    pub fn locus(&self) -> Option<GeneLocus> {
        let first = self.transcripts.first()?;
        let (start, end) = self
            .transcripts
            .iter()
            .filter_map(Transcript::span)
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))?;
        Some(GeneLocus {
            chrom: first.chrom.clone(),
            start,
            end,
            strand: first.strand,
        })
    }
}

pub fn detect_format(path: &Path) -> Result<InputFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "gtf" => Ok(InputFormat::Gtf),
        "gff" | "gff3" => Ok(InputFormat::Gff3),
        _ => Err(anyhow!(
            "unable to detect annotation format from extension: .{}",
            ext
        )),
    }
}

/// Load genes, transcripts and exons from GTF/GFF3.
///
/// Coordinates stay 1-based inclusive. Genes are returned sorted by id, transcripts keep
/// the order in which they first appear in the file, exons are sorted by start.
pub fn load_genes(path: &Path) -> Result<Vec<Gene>> {
    let builder = match detect_format(path)? {
        InputFormat::Gtf => load_gtf(path)?,
        InputFormat::Gff3 => load_gff3(path)?,
    };
    Ok(builder.finish())
}

struct GeneModelBuilder {
    transcripts: Vec<(Option<String>, Transcript)>,
    by_id: HashMap<String, usize>,
}

impl GeneModelBuilder {
    fn new() -> Self {
        Self {
            transcripts: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    fn transcript_mut(&mut self, id: &str, chrom: &str, strand: Strand) -> &mut (Option<String>, Transcript) {
        let idx = match self.by_id.get(id) {
            Some(&idx) => idx,
            None => {
                self.transcripts.push((None, Transcript::new(id, chrom, strand)));
                self.by_id.insert(id.to_string(), self.transcripts.len() - 1);
                self.transcripts.len() - 1
            }
        };
        &mut self.transcripts[idx]
    }

    fn set_gene(&mut self, transcript_id: &str, chrom: &str, strand: Strand, gene_id: String) {
        let entry = self.transcript_mut(transcript_id, chrom, strand);
        if entry.0.is_none() {
            entry.0 = Some(gene_id);
        }
    }

    fn add_exon(&mut self, transcript_id: &str, exon: Exon) {
        let entry = self.transcript_mut(transcript_id, &exon.chrom, exon.strand);
        entry.1.exons.push(exon);
    }

    fn finish(self) -> Vec<Gene> {
        let mut genes: BTreeMap<String, Vec<Transcript>> = BTreeMap::new();
        for (gene_id, mut tx) in self.transcripts {
            tx.exons.sort_by_key(|e| (e.start, e.end));
            let gene_id = gene_id.unwrap_or_else(|| tx.id.clone());
            genes.entry(gene_id).or_default().push(tx);
        }
        genes
            .into_iter()
            .map(|(id, transcripts)| Gene::new(id, transcripts))
            .collect()
    }
}

fn load_gtf(path: &Path) -> Result<GeneModelBuilder> {
    let reader = File::open(path)?;
    let mut reader = noodles::gtf::io::Reader::new(BufReader::new(reader));

    let mut builder = GeneModelBuilder::new();

    for result in reader.record_bufs() {
        let record = result?;

        let feature_type: &[u8] = record.ty().as_ref();
        if feature_type != b"transcript" && feature_type != b"exon" {
            continue;
        }

        let seqname = record.reference_sequence_name().to_string();
        let strand = convert_strand(record.strand());
        let start = record.start().get() as Pos;
        let end = record.end().get() as Pos;

        let attrs = record.attributes();
        let transcript_id = get_record_buf_attribute(attrs, b"transcript_id")
            .ok_or_else(|| anyhow!("missing transcript_id in GTF attributes"))?;
        let gene_id = get_record_buf_attribute(attrs, b"gene_id")
            .ok_or_else(|| anyhow!("missing gene_id in GTF attributes"))?;

        builder.set_gene(&transcript_id, &seqname, strand, gene_id);
        if feature_type == b"exon" {
            builder.add_exon(&transcript_id, Exon::new(seqname, start, end, strand));
        }
    }

    Ok(builder)
}

fn load_gff3(path: &Path) -> Result<GeneModelBuilder> {
    let reader = File::open(path)?;
    let mut reader = noodles::gff::io::Reader::new(BufReader::new(reader));

    let mut builder = GeneModelBuilder::new();

    for result in reader.record_bufs() {
        let record = result?;

        let feature_type: &[u8] = record.ty().as_ref();
        let is_transcript = feature_type == b"mRNA" || feature_type == b"transcript";
        if !is_transcript && feature_type != b"exon" {
            continue;
        }

        let seqname = record.reference_sequence_name().to_string();
        let strand = convert_strand(record.strand());
        let start = record.start().get() as Pos;
        let end = record.end().get() as Pos;

        let attrs = record.attributes();
        if is_transcript {
            let transcript_id = get_record_buf_attribute(attrs, b"ID")
                .ok_or_else(|| anyhow!("missing ID in GFF3 transcript attributes"))?;
            let gene_id = get_record_buf_attribute(attrs, b"Parent")
                .unwrap_or_else(|| transcript_id.clone());
            builder.set_gene(&transcript_id, &seqname, strand, gene_id);
        } else {
            let parents = get_record_buf_attribute_values(attrs, b"Parent");
            if parents.is_empty() {
                return Err(anyhow!("missing Parent in GFF3 exon attributes"));
            }
            let gene_parent = get_record_buf_attribute(attrs, b"GeneParent");
            for parent in parents {
                if let Some(gene_id) = &gene_parent {
                    builder.set_gene(&parent, &seqname, strand, gene_id.clone());
                }
                builder.add_exon(&parent, Exon::new(seqname.clone(), start, end, strand));
            }
        }
    }

    Ok(builder)
}

fn get_record_buf_attribute(
    attrs: &noodles::gff::feature::record_buf::Attributes,
    key: &[u8],
) -> Option<String> {
    let value = attrs.get(key)?;
    value.iter().next().map(|v| v.to_string())
}

fn get_record_buf_attribute_values(
    attrs: &noodles::gff::feature::record_buf::Attributes,
    key: &[u8],
) -> Vec<String> {
    attrs
        .get(key)
        .map(|value| value.iter().map(|v| v.to_string()).collect())
        .unwrap_or_default()
}

fn convert_strand(strand: noodles::gff::feature::record::Strand) -> Strand {
    use noodles::gff::feature::record::Strand as GffStrand;
    match strand {
        GffStrand::Forward => Strand::Forward,
        GffStrand::Reverse => Strand::Reverse,
        GffStrand::None | GffStrand::Unknown => Strand::Unknown,
    }
}
