use crate::alignment::AlignedRead;
use crate::annotation::Exon;
use crate::insert_len::TaggedMate;
use crate::interval::IntervalId;
use crate::types::{HashMap, HashMapExt, Pos};
use coitrees::{BasicCOITree, Interval, IntervalTree as CoitreeIntervalTree};

#[derive(Debug, Clone, Default)]
struct IntervalTag {
    idx: usize,
}

/// Annotated intervals indexed per chromosome for read tagging.
///
/// A read is tagged with every interval that contains its whole reference span, the
/// equivalent of `bedtools tagBam -f 1` without strand matching.
pub struct IntervalIndex {
    intervals: Vec<IntervalId>,
    trees: HashMap<String, BasicCOITree<IntervalTag, u32>>,
}

impl IntervalIndex {
    /// Build the index. Duplicate intervals are collapsed so that a read is never tagged
    /// twice with the same interval.
    pub fn new<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = IntervalId>,
    {
        let mut intervals: Vec<IntervalId> = intervals.into_iter().collect();
        intervals.sort();
        intervals.dedup();

        let mut by_chrom: HashMap<String, Vec<Interval<IntervalTag>>> = HashMap::new();
        for (idx, iv) in intervals.iter().enumerate() {
            // COITree intervals are end-inclusive, like IntervalId.
            let Some((first, last)) = coitree_range(iv.start, iv.end) else {
                tracing::warn!(interval = %iv, "interval exceeds i32 coordinates, not indexed");
                continue;
            };
            if last >= first {
                by_chrom
                    .entry(iv.chrom.clone())
                    .or_default()
                    .push(Interval::new(first, last, IntervalTag { idx }));
            }
        }

        let mut trees = HashMap::with_capacity(by_chrom.len());
        for (chrom, nodes) in by_chrom {
            trees.insert(chrom, BasicCOITree::new(&nodes));
        }

        Self { intervals, trees }
    }

    pub fn from_exons(exons: &[Exon]) -> Self {
        Self::new(exons.iter().map(Exon::interval_id))
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, interval: &IntervalId) -> bool {
        self.intervals.binary_search(interval).is_ok()
    }

    /// Intervals containing the 0-based, half-open reference span `[start, end)`, sorted.
    pub fn containing(&self, chrom: &str, start: Pos, end: Pos) -> Vec<IntervalId> {
        let Some(tree) = self.trees.get(chrom) else {
            return Vec::new();
        };
        if end <= start {
            return Vec::new();
        }

        // 1-based inclusive query.
        let Some((q_first, q_last)) = coitree_range(start + 1, end) else {
            return Vec::new();
        };

        let mut hits: Vec<usize> = Vec::new();
        tree.query(q_first, q_last, |node| {
            if node.first <= q_first && q_last <= node.last {
                hits.push(node.metadata.idx);
            }
        });
        hits.sort_unstable();

        hits.into_iter().map(|i| self.intervals[i].clone()).collect()
    }

    /// Intervals overlapping the 1-based inclusive range `[first, last]`, sorted.
    pub fn overlapping(&self, chrom: &str, first: Pos, last: Pos) -> Vec<IntervalId> {
        let Some(tree) = self.trees.get(chrom) else {
            return Vec::new();
        };
        if last < first {
            return Vec::new();
        }
        // Nothing indexed lies past i32::MAX, so only the start has to fit.
        let Ok(first) = i32::try_from(first) else {
            return Vec::new();
        };
        let last = i32::try_from(last).unwrap_or(i32::MAX);

        let mut hits: Vec<usize> = Vec::new();
        tree.query(first, last, |node| {
            hits.push(node.metadata.idx);
        });
        hits.sort_unstable();

        hits.into_iter().map(|i| self.intervals[i].clone()).collect()
    }

    pub fn tag(&self, chrom: &str, read: AlignedRead) -> TaggedMate {
        let (start, end) = read.reference_span();
        let intervals = self.containing(chrom, start, end);
        TaggedMate::new(read, intervals)
    }
}

/// Convert an inclusive range to COITree coordinates, `None` if either end overflows `i32`.
pub fn coitree_range(first: Pos, last: Pos) -> Option<(i32, i32)> {
    Some((i32::try_from(first).ok()?, i32::try_from(last).ok()?))
}
