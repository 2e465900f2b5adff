use crate::bam_input::{self, BamStats};
use crate::cli::{ConstExonsArgs, CoverageArgs, InsertLenArgs};
use anyhow::{Context, Result, anyhow};
use coitrees::{BasicCOITree, Interval, IntervalTree as CoitreeIntervalTree};
use crossfire::mpmc;
use splicecov_rs::annotation::load_genes;
use splicecov_rs::output::{
    write_const_exons_gff, write_coverage_track, write_insert_len_table, write_junction_table,
};
use splicecov_rs::{
    AlignedRead, ConstExonConfig, CoverageConfig, Gene, GeneLocus, IntervalIndex, TaggedMate,
    constitutive_exons_by_gene, estimate, extract, pair_mates, parse_tagged_intervals,
};
use splicecov_rs::tagging::coitree_range;
use splicecov_rs::types::{HashMap, HashMapExt};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

#[derive(Debug, Default)]
pub struct Stats {
    pub genes: u64,
    pub exons: u64,
    pub bams: u64,
    pub pairs: u64,
    pub junctions: u64,
    pub malformed_reads: u64,
}

pub fn run_const_exons(args: &ConstExonsArgs) -> Result<Stats> {
    let genes = load_genes(&args.gff)?;
    let config = ConstExonConfig {
        min_exon_size: args.min_exon_size,
        all_constitutive: args.all_constitutive,
    };
    let exons = constitutive_exons_by_gene(&genes, &config);

    let mut out = BufWriter::new(
        File::create(&args.out).with_context(|| format!("creating {}", args.out.display()))?,
    );
    write_const_exons_gff(&exons, &mut out)?;
    out.flush()?;

    Ok(Stats {
        genes: genes.len() as u64,
        exons: exons.len() as u64,
        ..Stats::default()
    })
}

pub fn run_insert_len(args: &InsertLenArgs, threads: usize) -> Result<Stats> {
    let genes = load_genes(&args.const_exons)?;
    let config = ConstExonConfig {
        min_exon_size: args.min_exon_size,
        ..ConstExonConfig::insert_len()
    };
    let exons = constitutive_exons_by_gene(&genes, &config);
    let index = IntervalIndex::from_exons(&exons);
    tracing::info!(
        exons = index.len(),
        min_exon_size = args.min_exon_size,
        "loaded constitutive exons"
    );

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let index = &index;
    let outputs = run_workers(args.bams.clone(), threads, |bam| {
        insert_len_for_bam(&bam, index, args)
    })?;

    let mut stats = Stats {
        genes: genes.len() as u64,
        exons: index.len() as u64,
        ..Stats::default()
    };
    for pairs in outputs.into_iter().flatten() {
        stats.bams += 1;
        stats.pairs += pairs as u64;
    }
    Ok(stats)
}

/// Pair and measure one BAM. Returns `None` when it holds no usable mates.
fn insert_len_for_bam(bam: &Path, index: &IntervalIndex, args: &InsertLenArgs) -> Result<Option<usize>> {
    let mut mates: Vec<TaggedMate> = Vec::new();
    let bam_stats = bam_input::read_alignments(bam, |aln| {
        let mate = if args.tagged {
            let intervals = match aln.intervals_tag.as_deref() {
                Some(tag) => parse_tagged_intervals(tag, &args.tag_label)
                    .with_context(|| format!("read {}", aln.read.name))?
                    .into_iter()
                    .filter(|iv| index.contains(iv))
                    .collect(),
                None => Vec::new(),
            };
            TaggedMate::new(aln.read, intervals)
        } else {
            index.tag(&aln.chrom, aln.read)
        };
        if !mate.intervals.is_empty() {
            mates.push(mate);
        }
        Ok(())
    })?;
    log_bam_stats(bam, &bam_stats);

    let pairing = pair_mates(mates);
    if pairing.pairs.is_empty() {
        tracing::warn!(
            bam = %bam.display(),
            unpaired = pairing.unpaired,
            "no paired mates, skipping; check that mate read names match"
        );
        return Ok(None);
    }

    let result = estimate(&pairing.pairs)
        .with_context(|| format!("estimating insert lengths for {}", bam.display()))?;

    let out_path = insert_len_path(&args.output_dir, bam);
    let mut out = BufWriter::new(
        File::create(&out_path).with_context(|| format!("creating {}", out_path.display()))?,
    );
    write_insert_len_table(&result.samples, &mut out)?;
    out.flush()?;

    tracing::info!(
        bam = %bam.display(),
        pairs = pairing.pairs.len(),
        unpaired = pairing.unpaired,
        kept = result.kept,
        out = %out_path.display(),
        "insert lengths written"
    );
    Ok(Some(pairing.pairs.len()))
}

fn insert_len_path(output_dir: &Path, bam: &Path) -> PathBuf {
    let base = bam
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reads.bam".to_string());
    output_dir.join(format!("{base}.insert_len"))
}

struct LocusJob {
    gene: Gene,
    locus: GeneLocus,
    reads: Vec<AlignedRead>,
}

struct LocusSummary {
    junctions: usize,
    malformed: usize,
}

pub fn run_coverage(args: &CoverageArgs, threads: usize) -> Result<Stats> {
    let mut genes = load_genes(&args.gff)?;
    if !args.genes.is_empty() {
        genes.retain(|g| args.genes.contains(&g.id));
        for wanted in &args.genes {
            if !genes.iter().any(|g| &g.id == wanted) {
                tracing::warn!(gene = %wanted, "gene not found in annotation");
            }
        }
    }

    let mut jobs: Vec<LocusJob> = Vec::with_capacity(genes.len());
    for gene in genes {
        match gene.locus() {
            Some(locus) => jobs.push(LocusJob {
                gene,
                locus,
                reads: Vec::new(),
            }),
            None => tracing::debug!(gene = %gene.id, "gene has no exons"),
        }
    }

    let trees = build_locus_trees(&jobs);
    let bam_stats = bam_input::read_alignments(&args.bam, |aln| {
        let Some(tree) = trees.get(&aln.chrom) else {
            return Ok(());
        };
        // One base of slack on the left: read starts are 0-based, loci 1-based.
        let (start, end) = aln.read.reference_span();
        let Ok(first) = i32::try_from(start) else {
            return Ok(());
        };
        let last = i32::try_from(end.max(start + 1)).unwrap_or(i32::MAX);
        let mut hits: Vec<usize> = Vec::new();
        tree.query(first, last, |node| hits.push(node.metadata.idx));
        hits.sort_unstable();
        for idx in hits {
            jobs[idx].reads.push(aln.read.clone());
        }
        Ok(())
    })?;
    log_bam_stats(&args.bam, &bam_stats);

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let config = CoverageConfig {
        scale: args.scale,
        logged: args.logged,
    };
    let n_genes = jobs.len() as u64;
    let output_dir = args.output_dir.as_path();
    let config = &config;
    let summaries = run_workers(jobs, threads, |job| coverage_for_locus(job, config, output_dir))?;

    let mut stats = Stats {
        genes: n_genes,
        bams: 1,
        ..Stats::default()
    };
    for summary in summaries {
        stats.junctions += summary.junctions as u64;
        stats.malformed_reads += summary.malformed as u64;
    }
    Ok(stats)
}

fn coverage_for_locus(job: LocusJob, config: &CoverageConfig, output_dir: &Path) -> Result<LocusSummary> {
    let LocusJob { gene, locus, reads } = job;
    let result = extract(&reads, locus.start, locus.end)
        .with_context(|| format!("gene {}", gene.id))?;

    let cov_path = output_dir.join(format!("{}.coverage.tsv", gene.id));
    let mut out = BufWriter::new(
        File::create(&cov_path).with_context(|| format!("creating {}", cov_path.display()))?,
    );
    write_coverage_track(locus.start, &config.apply(&result.coverage), &mut out)?;
    out.flush()?;

    let junc_path = output_dir.join(format!("{}.junctions.tsv", gene.id));
    let mut out = BufWriter::new(
        File::create(&junc_path).with_context(|| format!("creating {}", junc_path.display()))?,
    );
    write_junction_table(&result.junctions, &gene.transcripts, &mut out)?;
    out.flush()?;

    tracing::debug!(
        gene = %gene.id,
        reads = reads.len(),
        junctions = result.junctions.len(),
        malformed = result.malformed_count(),
        "locus done"
    );
    Ok(LocusSummary {
        junctions: result.junctions.len(),
        malformed: result.malformed_count(),
    })
}

#[derive(Debug, Clone, Default)]
struct LocusTag {
    idx: usize,
}

fn build_locus_trees(jobs: &[LocusJob]) -> HashMap<String, BasicCOITree<LocusTag, u32>> {
    let mut by_chrom: HashMap<String, Vec<Interval<LocusTag>>> = HashMap::new();
    for (idx, job) in jobs.iter().enumerate() {
        let Some((first, last)) = coitree_range(job.locus.start, job.locus.end) else {
            tracing::warn!(gene = %job.gene.id, "locus exceeds i32 coordinates, no reads binned");
            continue;
        };
        by_chrom
            .entry(job.locus.chrom.clone())
            .or_default()
            .push(Interval::new(first, last, LocusTag { idx }));
    }
    by_chrom
        .into_iter()
        .map(|(chrom, nodes)| (chrom, BasicCOITree::new(&nodes)))
        .collect()
}

fn log_bam_stats(bam: &Path, stats: &BamStats) {
    tracing::info!(
        bam = %bam.display(),
        total_reads = stats.total_reads,
        unmapped_reads = stats.unmapped_reads,
        skipped_reads = stats.skipped_reads,
        unnamed_reads = stats.unnamed_reads,
        "alignments read"
    );
}

struct WorkItem<T> {
    idx: usize,
    payload: T,
}

struct ResultItem<R> {
    idx: usize,
    result: Result<R>,
}

/// Apply `work` to every item on `threads` workers, returning results in input order.
fn run_workers<T, R, F>(items: Vec<T>, threads: usize, work: F) -> Result<Vec<R>>
where
    T: Send + Unpin + 'static,
    R: Send + Unpin + 'static,
    F: Fn(T) -> Result<R> + Sync,
{
    if threads <= 1 || items.len() <= 1 {
        return items.into_iter().map(&work).collect();
    }

    crossfire::detect_backoff_cfg();
    let worker_count = threads.min(items.len());
    let cap = worker_count.saturating_mul(4).max(8);
    let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem<T>>(cap);
    let (tx_res, rx_res) = mpmc::unbounded_blocking::<ResultItem<R>>();
    let total = items.len();
    let work = &work;

    thread::scope(|scope| -> Result<Vec<R>> {
        for _ in 0..worker_count {
            let rx_work = rx_work.clone();
            let tx_res = tx_res.clone();
            scope.spawn(move || {
                while let Ok(item) = rx_work.recv() {
                    let result = work(item.payload);
                    let _ = tx_res.send(ResultItem { idx: item.idx, result });
                }
            });
        }
        drop(tx_res);

        for (idx, payload) in items.into_iter().enumerate() {
            tx_work
                .send(WorkItem { idx, payload })
                .map_err(|_| anyhow!("worker queue closed"))?;
        }
        drop(tx_work);

        let mut pending: BTreeMap<usize, Result<R>> = BTreeMap::new();
        while pending.len() < total {
            let res = rx_res
                .recv()
                .map_err(|_| anyhow!("worker result channel closed"))?;
            pending.insert(res.idx, res.result);
        }

        pending.into_values().collect()
    })
}
