//! Source-side occurrence table used to pair entities by identifier.
//!
//! The table is built once per diff from the source identifiers, then target
//! entities claim matches in target order. Duplicate identifiers keep a queue
//! of candidate source indices that is claimed first in first out, ascending,
//! which makes duplicate resolution deterministic.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Candidate source indices sharing one identifier, claimed in the order
/// they were pushed.
#[derive(Debug)]
struct IndexQueue {
    indices: Vec<usize>,
    next: usize,
}

impl IndexQueue {
    fn with_indices(first: usize, second: usize) -> Self {
        Self {
            indices: vec![first, second],
            next: 0,
        }
    }

    fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    fn claim(&mut self) -> Option<usize> {
        let claimed = self.indices.get(self.next).copied();
        if claimed.is_some() {
            self.next += 1;
        }
        claimed
    }
}

/// How often an identifier occurs among the source entities.
#[derive(Debug)]
enum Occurrence {
    /// Exactly once. Claimable a single time.
    Unique { index: usize, claimed: bool },
    /// More than once. Indices are claimed in ascending order.
    Duplicate(IndexQueue),
}

/// Lookup table from identifier to source occurrence.
///
/// Every source index is handed out at most once across all claims.
#[derive(Debug)]
pub(crate) struct OccurrenceTable<K> {
    entries: HashMap<K, Occurrence>,
}

impl<K: Hash + Eq> OccurrenceTable<K> {
    /// Build the table from source identifiers in ascending index order.
    pub(crate) fn new(identifiers: impl ExactSizeIterator<Item = K>) -> Self {
        let mut entries = HashMap::with_capacity(identifiers.len());

        for (index, key) in identifiers.enumerate() {
            match entries.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(Occurrence::Unique {
                        index,
                        claimed: false,
                    });
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Occurrence::Unique { index: first, .. } => {
                        let queue = IndexQueue::with_indices(*first, index);
                        *slot.get_mut() = Occurrence::Duplicate(queue);
                    }
                    Occurrence::Duplicate(queue) => queue.push(index),
                },
            }
        }

        Self { entries }
    }

    /// Claim the next unclaimed source index for `key`, if any remains.
    pub(crate) fn claim(&mut self, key: &K) -> Option<usize> {
        match self.entries.get_mut(key)? {
            Occurrence::Unique { index, claimed } => {
                if *claimed {
                    None
                } else {
                    *claimed = true;
                    Some(*index)
                }
            }
            Occurrence::Duplicate(queue) => queue.claim(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_identifier_claims_once() {
        let mut table = OccurrenceTable::new(["a", "b"].into_iter());
        assert_eq!(table.claim(&"a"), Some(0));
        assert_eq!(table.claim(&"a"), None);
        assert_eq!(table.claim(&"b"), Some(1));
    }

    #[test]
    fn duplicates_claim_in_ascending_order() {
        let mut table = OccurrenceTable::new(["x", "y", "x", "x"].into_iter());
        assert_eq!(table.claim(&"x"), Some(0));
        assert_eq!(table.claim(&"x"), Some(2));
        assert_eq!(table.claim(&"x"), Some(3));
        assert_eq!(table.claim(&"x"), None);
    }

    #[test]
    fn unknown_identifier_is_unclaimed() {
        let mut table = OccurrenceTable::new(["a"].into_iter());
        assert_eq!(table.claim(&"z"), None);
    }
}
