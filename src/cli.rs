use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "splicecov-rs",
    about = "Coverage, splice junctions and insert lengths from RNA-seq alignments",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1, global = true)]
    pub threads: u8,

    /// Set logging level to WARN
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the constitutive exons of every gene as GFF3
    ConstExons(ConstExonsArgs),

    /// Compute per-exon insert length distributions from paired-end BAMs
    InsertLen(InsertLenArgs),

    /// Compute per-base coverage and splice junctions for each gene locus
    Coverage(CoverageArgs),
}

#[derive(Args, Debug)]
pub struct ConstExonsArgs {
    /// Gene models (GTF/GFF)
    #[arg(short = 'G', long = "gff", value_name = "GTF/GFF")]
    pub gff: PathBuf,

    /// Minimum size of a constitutive exon in bp
    #[arg(long, default_value_t = 20)]
    pub min_exon_size: u64,

    /// Treat every exon of the first transcript as constitutive
    #[arg(long)]
    pub all_constitutive: bool,

    /// Output GFF3 path
    #[arg(short = 'o', long = "out", value_name = "GFF")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct InsertLenArgs {
    /// Input BAMs with paired-end alignments
    #[arg(required = true, num_args = 1..)]
    pub bams: Vec<PathBuf>,

    /// Constitutive exons (GFF/GTF), e.g. the output of `const-exons`
    #[arg(short = 'G', long = "const-exons", value_name = "GFF")]
    pub const_exons: PathBuf,

    /// Minimum size of exon in bp used for the computation
    #[arg(long, default_value_t = 500)]
    pub min_exon_size: u64,

    /// Output directory for `<bam>.insert_len` tables
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Read intervals from `tagBam -intervals` YB tags instead of tagging internally
    #[arg(long)]
    pub tagged: bool,

    /// Label used in the YB tag (`-labels` of tagBam)
    #[arg(long, default_value = "gff")]
    pub tag_label: String,
}

#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// Input BAM with genomic alignments
    pub bam: PathBuf,

    /// Gene models (GTF/GFF)
    #[arg(short = 'G', long = "gff", value_name = "GTF/GFF")]
    pub gff: PathBuf,

    /// Restrict output to these gene ids (repeatable)
    #[arg(long = "gene", value_name = "ID")]
    pub genes: Vec<String>,

    /// Library coverage used to scale values as 1e3 * value / coverage
    #[arg(long)]
    pub scale: Option<f64>,

    /// Report log10(value + 1)
    #[arg(long)]
    pub logged: bool,

    /// Output directory for `<gene>.coverage.tsv` and `<gene>.junctions.tsv`
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,
}
