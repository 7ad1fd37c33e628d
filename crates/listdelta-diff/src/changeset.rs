//! Staged changeset value types.
//!
//! A [`Changeset`] is one stage of a multi-stage edit script; a
//! [`StagedChangeset`] is the ordered sequence of stages for one
//! source-to-target transition. Both are immutable value types: the scratch
//! state used to compute them never escapes here.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use listdelta_types::{ElementPath, Move};

/// One stage of a staged transformation.
///
/// `data` is the snapshot as it must look after this stage. The operation
/// lists transform the previous stage's data into `data`: deletions and
/// updates address pre-stage positions, insertions address post-stage
/// positions, and each move pairs a pre-stage source with a post-stage
/// target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset<C> {
    /// Snapshot after this stage.
    pub data: C,
    /// Pre-stage indices of deleted sections.
    pub section_deleted: Vec<usize>,
    /// Post-stage indices of inserted sections.
    pub section_inserted: Vec<usize>,
    /// Indices of sections whose own content changed.
    pub section_updated: Vec<usize>,
    /// Relocated sections.
    pub section_moved: Vec<Move<usize>>,
    /// Pre-stage paths of deleted elements.
    pub element_deleted: Vec<ElementPath>,
    /// Post-stage paths of inserted elements.
    pub element_inserted: Vec<ElementPath>,
    /// Pre-stage paths of elements whose content changed.
    pub element_updated: Vec<ElementPath>,
    /// Relocated elements.
    pub element_moved: Vec<Move<ElementPath>>,
}

impl<C> Changeset<C> {
    /// A changeset carrying `data` and no operations.
    pub fn new(data: C) -> Self {
        Self {
            data,
            section_deleted: Vec::new(),
            section_inserted: Vec::new(),
            section_updated: Vec::new(),
            section_moved: Vec::new(),
            element_deleted: Vec::new(),
            element_inserted: Vec::new(),
            element_updated: Vec::new(),
            element_moved: Vec::new(),
        }
    }

    /// Number of section-level operations.
    pub fn section_change_count(&self) -> usize {
        self.section_deleted.len()
            + self.section_inserted.len()
            + self.section_updated.len()
            + self.section_moved.len()
    }

    /// Number of element-level operations.
    pub fn element_change_count(&self) -> usize {
        self.element_deleted.len()
            + self.element_inserted.len()
            + self.element_updated.len()
            + self.element_moved.len()
    }

    /// Total number of operations.
    pub fn change_count(&self) -> usize {
        self.section_change_count() + self.element_change_count()
    }

    /// Returns `true` if this changeset performs no operations.
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }
}

/// The ordered sequence of changesets for one source-to-target transition.
///
/// Applying the changesets in order to a mirror of the source snapshot yields
/// the target snapshot, with every intermediate state internally consistent.
/// Empty when the snapshots already match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedChangeset<C>(Vec<Changeset<C>>);

impl<C> StagedChangeset<C> {
    /// An empty staged changeset.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap an already ordered list of changesets.
    pub fn from_changesets(changesets: Vec<Changeset<C>>) -> Self {
        Self(changesets)
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no stages.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The data of the final stage, equal to the target snapshot.
    pub fn final_data(&self) -> Option<&C> {
        self.0.last().map(|changeset| &changeset.data)
    }

    /// Total operations across all stages.
    pub fn total_change_count(&self) -> usize {
        self.0.iter().map(Changeset::change_count).sum()
    }

    /// Consume the sequence, yielding the stages.
    pub fn into_changesets(self) -> Vec<Changeset<C>> {
        self.0
    }
}

impl<C> Default for StagedChangeset<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Deref for StagedChangeset<C> {
    type Target = [Changeset<C>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C> IntoIterator for StagedChangeset<C> {
    type Item = Changeset<C>;
    type IntoIter = std::vec::IntoIter<Changeset<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, C> IntoIterator for &'a StagedChangeset<C> {
    type Item = &'a Changeset<C>;
    type IntoIter = std::slice::Iter<'a, Changeset<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<C> FromIterator<Changeset<C>> for StagedChangeset<C> {
    fn from_iter<I: IntoIterator<Item = Changeset<C>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Changeset<Vec<u32>> {
        let mut changeset = Changeset::new(vec![2, 1]);
        changeset.element_moved = vec![Move::new(ElementPath::new(0, 1), ElementPath::new(0, 0))];
        changeset
    }

    #[test]
    fn change_counts() {
        let changeset = sample();
        assert_eq!(changeset.element_change_count(), 1);
        assert_eq!(changeset.section_change_count(), 0);
        assert_eq!(changeset.change_count(), 1);
        assert!(!changeset.is_empty());
        assert!(Changeset::new(Vec::<u32>::new()).is_empty());
    }

    #[test]
    fn staged_collection_behaviors() {
        let staged: StagedChangeset<Vec<u32>> = std::iter::once(sample()).collect();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged.final_data(), Some(&vec![2, 1]));
        assert_eq!(staged.total_change_count(), 1);
        assert_eq!(staged[0].element_moved.len(), 1);

        let collected: Vec<_> = (&staged).into_iter().collect();
        assert_eq!(collected.len(), 1);

        let owned: Vec<_> = staged.into_iter().collect();
        assert_eq!(owned.len(), 1);

        let rebuilt = StagedChangeset::from_changesets(owned);
        assert_eq!(rebuilt.into_changesets(), vec![sample()]);
    }

    #[test]
    fn empty_staged_changeset() {
        let staged: StagedChangeset<Vec<u32>> = StagedChangeset::new();
        assert!(staged.is_empty());
        assert_eq!(staged.final_data(), None);
    }

    #[test]
    fn serde_roundtrip() {
        let staged = StagedChangeset::from_changesets(vec![sample()]);
        let json = serde_json::to_string(&staged).unwrap();
        let parsed: StagedChangeset<Vec<u32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(staged, parsed);
    }
}
