use splicecov_rs::{IntervalId, IntervalParseError, Strand, parse_tagged_intervals};

#[test]
fn interval_string_form() {
    let iv = IntervalId::new("chr1", 1001, 1500, Strand::Forward).unwrap();
    assert_eq!(iv.to_string(), "chr1:1001-1500:+");
    assert_eq!(iv.length(), 500);

    let parsed: IntervalId = "chr1:1001-1500:+".parse().unwrap();
    assert_eq!(parsed, iv);
}

/// Chromosome names may themselves contain colons (e.g. HLA contigs).
#[test]
fn chrom_with_colon() {
    let parsed: IntervalId = "HLA-A*01:01:01:01:10-20:-".parse().unwrap();
    assert_eq!(parsed.chrom, "HLA-A*01:01:01:01");
    assert_eq!((parsed.start, parsed.end), (10, 20));
    assert_eq!(parsed.strand, Strand::Reverse);
}

#[test]
fn malformed_interval_strings() {
    assert!(matches!(
        "chr1:1001-1500".parse::<IntervalId>(),
        Err(IntervalParseError::InvalidInterval(_))
    ));
    assert!(matches!(
        "chr1:abc-1500:+".parse::<IntervalId>(),
        Err(IntervalParseError::InvalidCoordinate(_))
    ));
    assert!(matches!(
        "chr1:10-20:x".parse::<IntervalId>(),
        Err(IntervalParseError::InvalidStrand(_))
    ));
    assert_eq!(
        "chr1:20-10:+".parse::<IntervalId>(),
        Err(IntervalParseError::Inverted { start: 20, end: 10 })
    );
}

/// `tagBam -intervals` entries carry 0-based starts.
#[test]
fn parses_tagged_intervals() {
    let tag = "gff:chr2:999-1500,exon1,0,+;gff:chr2:2999-3400,exon2,0,-";
    let ivs = parse_tagged_intervals(tag, "gff").unwrap();
    assert_eq!(
        ivs,
        vec![
            IntervalId::new("chr2", 1000, 1500, Strand::Forward).unwrap(),
            IntervalId::new("chr2", 3000, 3400, Strand::Reverse).unwrap(),
        ]
    );
}

#[test]
fn tagged_intervals_other_label_is_empty() {
    let ivs = parse_tagged_intervals("gff:chr2:999-1500,exon1,0,+", "bed").unwrap();
    assert!(ivs.is_empty());
}

#[test]
fn tagged_interval_without_strand_fails() {
    assert!(parse_tagged_intervals("gff:chr2:999-1500,exon1", "gff").is_err());
}
