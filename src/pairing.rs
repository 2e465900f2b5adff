use crate::alignment::Mate;
use crate::insert_len::{MatePair, TaggedMate};
use crate::types::{HashMap, HashMapExt};

#[derive(Debug, Default)]
pub struct Pairing {
    /// Pairs in the order their second mate was seen.
    pub pairs: Vec<MatePair>,
    /// Mates whose partner never showed up.
    pub unpaired: usize,
}

/// Match mates by read name.
///
/// Input order does not need to be name-sorted; a mate waits until a record with the same
/// name arrives. Within a pair, the mate with the smaller alignment start becomes `left`.
pub fn pair_mates<I>(mates: I) -> Pairing
where
    I: IntoIterator<Item = TaggedMate>,
{
    let mut pending: HashMap<String, TaggedMate> = HashMap::new();
    let mut pairs = Vec::new();

    for mate in mates {
        match pending.remove(&mate.read.name) {
            Some(earlier) => {
                let name = mate.read.name.clone();
                let (left, right) = assign_pair_order(earlier, mate);
                pairs.push(MatePair::new(name, left, right));
            }
            None => {
                pending.insert(mate.read.name.clone(), mate);
            }
        }
    }

    Pairing {
        pairs,
        unpaired: pending.len(),
    }
}

fn assign_pair_order(a: TaggedMate, b: TaggedMate) -> (TaggedMate, TaggedMate) {
    if a.read.start < b.read.start {
        return (a, b);
    }
    if b.read.start < a.read.start {
        return (b, a);
    }
    if b.read.mate == Mate::First && a.read.mate != Mate::First {
        return (b, a);
    }
    (a, b)
}
