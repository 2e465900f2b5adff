/// End-to-end tests that run the splicecov-rs binary on small generated annotations.
///
/// Inputs are written to a per-test directory under the system temp dir, so the tests
/// need no checked-in data.
use noodles::bam;
use noodles::core::Position;
use noodles::sam;
use noodles::sam::alignment::io::Write as _;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::{Op, op::Kind};
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::{
    Cigar as SamCigar, RecordBuf, Sequence, data::field::Value,
};
use noodles::sam::header::record::value::{Map, map::ReferenceSequence};
use splicecov_rs::annotation::load_genes;
use std::fs::{self, File};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::Command;

// ── helpers ──────────────────────────────────────────────────────────────────

const GTF: &str = "\
chr1\ttest\ttranscript\t100\t650\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t100\t199\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t300\t309\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t400\t499\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t600\t650\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\ttranscript\t100\t650\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t2\";
chr1\ttest\texon\t100\t199\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t2\";
chr1\ttest\texon\t300\t309\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t2\";
chr1\ttest\texon\t600\t650\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t2\";
chr2\ttest\ttranscript\t5000\t5999\t.\t-\t.\tgene_id \"g2\"; transcript_id \"t3\";
chr2\ttest\texon\t5000\t5999\t.\t-\t.\tgene_id \"g2\"; transcript_id \"t3\";
";

/// Single-exon gene whose 1000 bp exon survives the 500 bp insert-length filter.
const EXON_GTF: &str = "\
chr1\ttest\ttranscript\t1001\t2000\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t1001\t2000\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
";

/// Two-exon gene spanning 1001-1025 with an intron at 1011-1015.
const SPLICED_GTF: &str = "\
chr1\ttest\ttranscript\t1001\t1025\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t1001\t1010\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
chr1\ttest\texon\t1016\t1025\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
";

const YB_EXON: &str = "gff:chr1:1000-2000,exon,0,+";

struct TestRecord {
    name: Option<&'static str>,
    flags: Flags,
    /// 1-based; ignored for unmapped records.
    pos: usize,
    cigar: &'static [(Kind, usize)],
    yb: Option<&'static str>,
}

fn rec(
    name: &'static str,
    flags: Flags,
    pos: usize,
    cigar: &'static [(Kind, usize)],
) -> TestRecord {
    TestRecord {
        name: Some(name),
        flags,
        pos,
        cigar,
        yb: None,
    }
}

fn first_mate() -> Flags {
    Flags::SEGMENTED | Flags::FIRST_SEGMENT
}

fn last_mate() -> Flags {
    Flags::SEGMENTED | Flags::LAST_SEGMENT | Flags::REVERSE_COMPLEMENTED
}

const M50: &[(Kind, usize)] = &[(Kind::Match, 50)];

fn write_bam(path: &Path, records: &[TestRecord]) {
    let header = sam::Header::builder()
        .add_reference_sequence(
            "chr1",
            Map::<ReferenceSequence>::new(NonZeroUsize::new(100_000).unwrap()),
        )
        .build();

    let mut writer = bam::io::Writer::new(File::create(path).expect("create BAM"));
    writer.write_header(&header).expect("write header");

    for r in records {
        let mut record = RecordBuf::default();
        if let Some(name) = r.name {
            record.name_mut().replace(name.into());
        }
        *record.flags_mut() = r.flags;
        if !r.flags.is_unmapped() {
            *record.reference_sequence_id_mut() = Some(0);
            *record.alignment_start_mut() = Some(Position::try_from(r.pos).unwrap());
            let cigar: SamCigar = r.cigar.iter().map(|&(kind, len)| Op::new(kind, len)).collect();
            *record.cigar_mut() = cigar;
            let read_len: usize = r
                .cigar
                .iter()
                .filter(|(kind, _)| kind.consumes_read())
                .map(|(_, len)| len)
                .sum();
            *record.sequence_mut() = Sequence::from(vec![b'A'; read_len]);
        }
        if let Some(yb) = r.yb {
            record
                .data_mut()
                .insert(Tag::new(b'Y', b'B'), Value::String(yb.into()));
        }
        writer.write_alignment_record(&header, &record).expect("write record");
    }

    writer.try_finish().expect("finish BAM");
}

/// Mates in the BAM are listed in the order a name-sorted file would hold them.
fn insert_len_records() -> Vec<TestRecord> {
    vec![
        // 0-based 1100 and 1200: (1200 + 50) - 1100 + 1
        rec("p1", first_mate(), 1101, M50),
        rec("p1", last_mate(), 1201, M50),
        // (1500 + 50) - 1300 + 1
        rec("p2", first_mate(), 1301, M50),
        rec("p2", last_mate(), 1501, M50),
        // secondary mate must not complete the pair
        rec("p3", first_mate(), 1601, M50),
        rec("p3", last_mate() | Flags::SECONDARY, 1701, M50),
        // unmapped mate
        rec("p4", first_mate(), 1801, M50),
        rec("p4", last_mate() | Flags::UNMAPPED, 0, &[]),
        // unnamed records must not pair with each other
        TestRecord {
            name: None,
            flags: first_mate(),
            pos: 1851,
            cigar: M50,
            yb: None,
        },
        TestRecord {
            name: None,
            flags: last_mate(),
            pos: 1901,
            cigar: M50,
            yb: None,
        },
        // leaves the exon: untagged, so p5 stays unpaired
        rec("p5", first_mate(), 1901, M50),
        rec("p5", last_mate(), 1981, M50),
    ]
}

fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("splicecov-rs-{}-{}", test, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn splicecov_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_splicecov-rs"))
}

fn run_binary(args: &[&str]) -> std::process::Output {
    Command::new(splicecov_bin())
        .arg("-q")
        .args(args)
        .output()
        .expect("failed to spawn splicecov-rs")
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 path")
}

// ── tests ─────────────────────────────────────────────────────────────────────

/// Exon 400-499 is missing from t2 and 300-309 is shorter than the default 20 bp.
#[test]
fn const_exons_from_gtf() {
    let dir = scratch_dir("const-exons");
    let gtf = dir.join("genes.gtf");
    let out = dir.join("const_exons.gff");
    fs::write(&gtf, GTF).unwrap();

    let output = run_binary(&["const-exons", "-G", path_str(&gtf), "-o", path_str(&out)]);
    assert!(output.status.success(), "splicecov-rs exited with {}", output.status);

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "##gff-version 3",
            "chr1\tconst_exons\texon\t100\t199\t.\t+\t.\tID=chr1:100-199:+;Parent=g1;GeneParent=g1",
            "chr1\tconst_exons\texon\t600\t650\t.\t+\t.\tID=chr1:600-650:+;Parent=g1;GeneParent=g1",
            "chr2\tconst_exons\texon\t5000\t5999\t.\t-\t.\tID=chr2:5000-5999:-;Parent=g2;GeneParent=g2",
        ]
    );

    // The written file loads back as one transcript per gene.
    let genes = load_genes(&out).unwrap();
    assert_eq!(genes.len(), 2);
    assert_eq!(genes[0].id, "g1");
    assert_eq!(genes[0].transcripts.len(), 1);
    assert_eq!(genes[0].transcripts[0].exons.len(), 2);
    assert_eq!(genes[1].transcripts[0].exons[0].strand, splicecov_rs::Strand::Reverse);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn const_exons_all_constitutive_and_min_size() {
    let dir = scratch_dir("const-exons-all");
    let gtf = dir.join("genes.gtf");
    let out = dir.join("const_exons.gff");
    fs::write(&gtf, GTF).unwrap();

    let output = run_binary(&[
        "const-exons",
        "-G",
        path_str(&gtf),
        "-o",
        path_str(&out),
        "--all-constitutive",
        "--min-exon-size",
        "10",
    ]);
    assert!(output.status.success(), "splicecov-rs exited with {}", output.status);

    let genes = load_genes(&out).unwrap();
    let starts: Vec<u64> = genes[0].transcripts[0].exons.iter().map(|e| e.start).collect();
    assert_eq!(starts, vec![100, 300, 400, 600]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_annotation_format_fails() {
    let dir = scratch_dir("bad-format");
    let ann = dir.join("genes.txt");
    fs::write(&ann, GTF).unwrap();

    let output = run_binary(&[
        "const-exons",
        "-G",
        path_str(&ann),
        "-o",
        path_str(&dir.join("out.gff")),
    ]);
    assert!(!output.status.success());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_bam_fails() {
    let dir = scratch_dir("missing-bam");
    let gtf = dir.join("genes.gtf");
    fs::write(&gtf, GTF).unwrap();

    let output = run_binary(&[
        "coverage",
        path_str(&dir.join("absent.bam")),
        "-G",
        path_str(&gtf),
        "-o",
        path_str(&dir.join("cov")),
    ]);
    assert!(!output.status.success());

    let _ = fs::remove_dir_all(&dir);
}

/// Internal tagging against the exon, then pairing and measuring.
#[test]
fn insert_len_from_bam() {
    let dir = scratch_dir("insert-len");
    let gtf = dir.join("exons.gtf");
    let bam = dir.join("reads.bam");
    let out_dir = dir.join("out");
    fs::write(&gtf, EXON_GTF).unwrap();
    write_bam(&bam, &insert_len_records());

    let output = run_binary(&[
        "insert-len",
        path_str(&bam),
        "-G",
        path_str(&gtf),
        "-o",
        path_str(&out_dir),
    ]);
    assert!(output.status.success(), "splicecov-rs exited with {}", output.status);

    let table = fs::read_to_string(out_dir.join("reads.bam.insert_len")).unwrap();
    assert_eq!(table, "#region\tinsert_len\nchr1:1001-2000:+\t151,251\n");

    let _ = fs::remove_dir_all(&dir);
}

/// Intervals taken from `YB` tags; the untagged pair is dropped.
#[test]
fn insert_len_from_yb_tags() {
    let dir = scratch_dir("insert-len-tagged");
    let gtf = dir.join("exons.gtf");
    let bam = dir.join("tagged.bam");
    let out_dir = dir.join("out");
    fs::write(&gtf, EXON_GTF).unwrap();

    let mut records = insert_len_records();
    for r in records.iter_mut().filter(|r| r.name == Some("p1")) {
        r.yb = Some(YB_EXON);
    }
    write_bam(&bam, &records);

    let output = run_binary(&[
        "insert-len",
        path_str(&bam),
        "-G",
        path_str(&gtf),
        "-o",
        path_str(&out_dir),
        "--tagged",
    ]);
    assert!(output.status.success(), "splicecov-rs exited with {}", output.status);

    let table = fs::read_to_string(out_dir.join("tagged.bam.insert_len")).unwrap();
    assert_eq!(table, "#region\tinsert_len\nchr1:1001-2000:+\t151\n");

    let _ = fs::remove_dir_all(&dir);
}

/// A BAM without any pair inside an exon is skipped, not an error.
#[test]
fn insert_len_without_pairs_writes_nothing() {
    let dir = scratch_dir("insert-len-empty");
    let gtf = dir.join("exons.gtf");
    let bam = dir.join("single.bam");
    let out_dir = dir.join("out");
    fs::write(&gtf, EXON_GTF).unwrap();
    write_bam(&bam, &[rec("s1", Flags::empty(), 1101, M50)]);

    let output = run_binary(&[
        "insert-len",
        path_str(&bam),
        "-G",
        path_str(&gtf),
        "-o",
        path_str(&out_dir),
    ]);
    assert!(output.status.success(), "splicecov-rs exited with {}", output.status);
    assert!(!out_dir.join("single.bam.insert_len").exists());

    let _ = fs::remove_dir_all(&dir);
}

/// Two spliced reads count; the secondary and unmapped copies do not.
#[test]
fn coverage_from_bam() {
    const SPLICED: &[(Kind, usize)] = &[(Kind::Match, 5), (Kind::Skip, 5), (Kind::Match, 5)];

    let dir = scratch_dir("coverage");
    let gtf = dir.join("genes.gtf");
    let bam = dir.join("reads.bam");
    let out_dir = dir.join("cov");
    fs::write(&gtf, SPLICED_GTF).unwrap();
    write_bam(
        &bam,
        &[
            rec("s1", Flags::empty(), 1006, SPLICED),
            rec("s2", Flags::empty(), 1006, SPLICED),
            rec("s3", Flags::SECONDARY, 1006, SPLICED),
            rec("s4", Flags::UNMAPPED, 0, &[]),
        ],
    );

    let output = run_binary(&[
        "coverage",
        path_str(&bam),
        "-G",
        path_str(&gtf),
        "-o",
        path_str(&out_dir),
    ]);
    assert!(output.status.success(), "splicecov-rs exited with {}", output.status);

    // Locus start 1001 puts track index 0 at 1-based 1002. The 0-based read start 1005
    // gives blocks at 1-based 1006-1010 and 1016-1020.
    let mut expected = String::from("#position\tcoverage\n");
    for pos in 1002..=1026 {
        let covered = (1006..=1010).contains(&pos) || (1016..=1020).contains(&pos);
        expected.push_str(&format!("{pos}\t{}\n", if covered { "0.2" } else { "0" }));
    }
    let coverage = fs::read_to_string(out_dir.join("g1.coverage.tsv")).unwrap();
    assert_eq!(coverage, expected);

    let junctions = fs::read_to_string(out_dir.join("g1.junctions.tsv")).unwrap();
    assert_eq!(junctions, "#donor\tacceptor\tcount\tisoforms\n1010\t1016\t2\t1\n");

    let _ = fs::remove_dir_all(&dir);
}
