use splicecov_rs::{AlignedRead, IntervalId, Mate, Strand, TaggedMate, estimate, pair_mates};

fn exon() -> IntervalId {
    IntervalId::new("chr1", 900, 2000, Strand::Forward).unwrap()
}

fn mate(name: &str, start: u64, which: Mate) -> TaggedMate {
    let read = AlignedRead::new(name, start, "50M".parse().unwrap()).with_mate(which);
    TaggedMate::new(read, vec![exon()])
}

/// The mate seen first in the BAM is not necessarily the left one.
#[test]
fn left_mate_has_smaller_start() {
    let pairing = pair_mates(vec![mate("a", 1100, Mate::First), mate("a", 1000, Mate::Second)]);
    assert_eq!(pairing.pairs.len(), 1);
    assert_eq!(pairing.unpaired, 0);

    let p = &pairing.pairs[0];
    assert_eq!(p.name, "a");
    assert_eq!(p.left.read.start, 1000);
    assert_eq!(p.right.read.start, 1100);
    assert_eq!(p.fragment_len(), 151);
}

#[test]
fn tie_puts_first_segment_left() {
    let pairing = pair_mates(vec![mate("a", 1000, Mate::Second), mate("a", 1000, Mate::First)]);
    let p = &pairing.pairs[0];
    assert_eq!(p.left.read.mate, Mate::First);
    assert_eq!(p.right.read.mate, Mate::Second);
}

#[test]
fn interleaved_names_and_orphans() {
    let pairing = pair_mates(vec![
        mate("a", 1000, Mate::First),
        mate("b", 1200, Mate::First),
        mate("orphan", 1300, Mate::First),
        mate("b", 1400, Mate::Second),
        mate("a", 1100, Mate::Second),
    ]);
    let names: Vec<&str> = pairing.pairs.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(pairing.unpaired, 1);

    let out = estimate(&pairing.pairs).unwrap();
    assert_eq!(out.kept, 2);
    assert_eq!(out.samples.get(&exon()), Some(&vec![251, 151]));
}

#[test]
fn empty_input() {
    let pairing = pair_mates(Vec::new());
    assert!(pairing.pairs.is_empty());
    assert_eq!(pairing.unpaired, 0);
}
