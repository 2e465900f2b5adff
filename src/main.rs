mod bam_input;
mod cli;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use cli::Command;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let threads = args.threads.max(1) as usize;
    let stats = match &args.cmd {
        Command::ConstExons(cmd) => pipeline::run_const_exons(cmd)?,
        Command::InsertLen(cmd) => pipeline::run_insert_len(cmd, threads)?,
        Command::Coverage(cmd) => pipeline::run_coverage(cmd, threads)?,
    };
    tracing::info!(
        genes = stats.genes,
        exons = stats.exons,
        bams = stats.bams,
        pairs = stats.pairs,
        junctions = stats.junctions,
        malformed_reads = stats.malformed_reads,
        "splicecov-rs: processing complete"
    );
    Ok(())
}
