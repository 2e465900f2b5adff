//! Fragment (insert) length estimation from mate pairs inside annotated intervals.

use crate::alignment::AlignedRead;
use crate::error::InsertLenError;
use crate::interval::IntervalId;
use std::collections::BTreeMap;

/// Fragment lengths observed per interval. Order within a list carries no meaning.
pub type IntervalInsertSamples = BTreeMap<IntervalId, Vec<u64>>;

/// A mate together with every annotated interval it was tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedMate {
    pub read: AlignedRead,
    pub intervals: Vec<IntervalId>,
}

impl TaggedMate {
    pub fn new(read: AlignedRead, intervals: Vec<IntervalId>) -> Self {
        Self { read, intervals }
    }
}

/// Two mates of one template; `left` is the mate with the smaller alignment start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatePair {
    pub name: String,
    pub left: TaggedMate,
    pub right: TaggedMate,
}

impl MatePair {
    pub fn new(name: impl Into<String>, left: TaggedMate, right: TaggedMate) -> Self {
        Self {
            name: name.into(),
            left,
            right,
        }
    }

    /// The interval both mates fall in, if the pair is usable for insert lengths.
    ///
    /// Each mate must overlap exactly one interval, the two must agree, and neither mate
    /// may be anything but a single `M` block.
    pub fn shared_interval(&self) -> Option<&IntervalId> {
        let [left_iv] = self.left.intervals.as_slice() else {
            return None;
        };
        let [right_iv] = self.right.intervals.as_slice() else {
            return None;
        };
        if left_iv != right_iv {
            return None;
        }
        if !self.left.read.cigar.is_single_match() || !self.right.read.cigar.is_single_match() {
            return None;
        }
        Some(left_iv)
    }

    /// `right end - left start + 1` in reference bases.
    pub fn fragment_len(&self) -> i64 {
        self.right.read.reference_end() as i64 - self.left.read.start as i64 + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertLenEstimate {
    pub samples: IntervalInsertSamples,
    pub kept: usize,
    pub discarded: usize,
}

impl InsertLenEstimate {
    pub fn total_samples(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }
}

/// Compute fragment lengths for every usable pair, grouped by interval.
///
/// Pairs failing [`MatePair::shared_interval`] are only counted. A usable pair with a
/// fragment length of zero or less means the mates are mis-ordered upstream, so the whole
/// call fails instead of recording it.
pub fn estimate<'a, I>(pairs: I) -> Result<InsertLenEstimate, InsertLenError>
where
    I: IntoIterator<Item = &'a MatePair>,
{
    let mut result = InsertLenEstimate::default();

    for pair in pairs {
        let Some(interval) = pair.shared_interval() else {
            result.discarded += 1;
            continue;
        };

        let length = pair.fragment_len();
        if length <= 0 {
            return Err(InsertLenError::NonPositive {
                interval: interval.clone(),
                length,
            });
        }

        result
            .samples
            .entry(interval.clone())
            .or_default()
            .push(length as u64);
        result.kept += 1;
    }

    if result.kept + result.discarded == 0 {
        tracing::warn!("no paired mates");
    } else {
        tracing::info!(
            kept = result.kept,
            discarded = result.discarded,
            intervals = result.samples.len(),
            "used paired mates"
        );
    }

    Ok(result)
}
