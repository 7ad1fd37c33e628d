//! Flat diff: compare two ordered snapshots and produce an edit script.
//!
//! Matching is identifier-based. An occurrence table built over the source
//! resolves duplicate identifiers by claiming candidate indices first in
//! first out, in ascending index order, while the target is walked in
//! ascending order. Content equality is only consulted for matched pairs.
//!
//! # Invariants
//!
//! - `deleted` and `updated` are in source coordinates, `inserted` in target
//!   coordinates, and every `moved` pair is (source, target).
//! - Each source index is matched by at most one target index and vice versa.
//! - Matching never depends on content, only on identifiers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use listdelta_types::{Differentiable, ElementPath, Move};

use crate::changeset::{Changeset, StagedChangeset};
use crate::occurrence::OccurrenceTable;

/// Per-source scratch record tracking how one entity fared.
///
/// `reference` is the matched position in the other snapshot, if any.
/// `delete_offset` counts deletions at earlier source positions and is used
/// to remap this entity's index into post-deletion coordinates. `is_tracked`
/// marks entities already consumed by a deletion or a match walk.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Trace<R> {
    pub(crate) reference: Option<R>,
    pub(crate) delete_offset: usize,
    pub(crate) is_tracked: bool,
}

impl<R> Default for Trace<R> {
    fn default() -> Self {
        Self {
            reference: None,
            delete_offset: 0,
            is_tracked: false,
        }
    }
}

/// Raw output of one matching pass, including the scratch state that later
/// staging passes need for index remapping.
pub(crate) struct DifferentiateResult {
    pub(crate) deleted: Vec<usize>,
    pub(crate) inserted: Vec<usize>,
    pub(crate) updated: Vec<usize>,
    /// Moves with the source index still in raw source coordinates.
    pub(crate) moved: Vec<Move<usize>>,
    pub(crate) source_traces: Vec<Trace<usize>>,
    pub(crate) target_references: Vec<Option<usize>>,
}

/// Match `source` against `target` at one level and classify every position.
///
/// `track_target_index_as_updated` selects the coordinate space for updates:
/// source space for element diffs (updates are applied before any structural
/// change), target space for section diffs (section updates are applied after
/// the structure is final).
pub(crate) fn differentiate<T: Differentiable>(
    source: &[T],
    target: &[T],
    track_target_index_as_updated: bool,
) -> DifferentiateResult {
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();
    let mut updated = Vec::new();
    let mut moved = Vec::new();

    let mut source_traces: Vec<Trace<usize>> = vec![Trace::default(); source.len()];
    let mut target_references: Vec<Option<usize>> = vec![None; target.len()];

    let mut table =
        OccurrenceTable::new(source.iter().map(|element| element.difference_identifier()));

    // Pair each target entity with an unclaimed source entity sharing its
    // identifier, in target order.
    for (target_index, element) in target.iter().enumerate() {
        if let Some(source_index) = table.claim(&element.difference_identifier()) {
            target_references[target_index] = Some(source_index);
            source_traces[source_index].reference = Some(target_index);
        }
    }

    // Unclaimed source entities are deletions. Each entity's delete offset is
    // recorded before the decision so later remapping sees the count of
    // deletions strictly before it.
    let mut offset_by_delete = 0;
    for (source_index, trace) in source_traces.iter_mut().enumerate() {
        trace.delete_offset = offset_by_delete;
        if trace.reference.is_none() {
            deleted.push(source_index);
            trace.is_tracked = true;
            offset_by_delete += 1;
        }
    }

    // Walk the target again for updates, moves and insertions. The untracked
    // pointer holds the lowest source index not yet consumed; matching any
    // other index means the entity broke relative order and moved.
    let mut untracked_source_index = Some(0);
    for (target_index, target_element) in target.iter().enumerate() {
        untracked_source_index = untracked_source_index.and_then(|index| {
            source_traces[index..]
                .iter()
                .position(|trace| !trace.is_tracked)
                .map(|found| index + found)
        });

        match target_references[target_index] {
            Some(source_index) => {
                source_traces[source_index].is_tracked = true;

                if !target_element.is_content_equal(&source[source_index]) {
                    updated.push(if track_target_index_as_updated {
                        target_index
                    } else {
                        source_index
                    });
                }

                if Some(source_index) != untracked_source_index {
                    moved.push(Move::new(source_index, target_index));
                }
            }
            None => inserted.push(target_index),
        }
    }

    DifferentiateResult {
        deleted,
        inserted,
        updated,
        moved,
        source_traces,
        target_references,
    }
}

/// The result of comparing two flat snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Source-space indices of entities absent from the target.
    pub deleted: Vec<usize>,
    /// Target-space indices of entities absent from the source.
    pub inserted: Vec<usize>,
    /// Source-space indices of matched entities whose content changed.
    pub updated: Vec<usize>,
    /// Matched entities whose relative order changed, as (source, target).
    pub moved: Vec<Move<usize>>,
}

impl DiffResult {
    /// Returns `true` if the snapshots matched exactly.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
            && self.inserted.is_empty()
            && self.updated.is_empty()
            && self.moved.is_empty()
    }

    /// Number of recorded changes.
    pub fn change_count(&self) -> usize {
        self.deleted.len() + self.inserted.len() + self.updated.len() + self.moved.len()
    }
}

/// Compare two flat snapshots.
///
/// Duplicate identifiers are allowed in both snapshots; claims resolve first
/// in first out by ascending source index, so results are deterministic.
pub fn diff<T: Differentiable>(source: &[T], target: &[T]) -> DiffResult {
    let result = differentiate(source, target, false);

    debug!(
        deleted = result.deleted.len(),
        inserted = result.inserted.len(),
        updated = result.updated.len(),
        moved = result.moved.len(),
        "computed flat diff"
    );

    DiffResult {
        deleted: result.deleted,
        inserted: result.inserted,
        updated: result.updated,
        moved: result.moved,
    }
}

/// Compare two flat snapshots and stage the edit script.
///
/// At most three changesets are produced: content updates, deletions, then
/// insertions plus moves. Move sources in the last stage are remapped into
/// post-deletion coordinates. Element paths use section 0 throughout.
pub fn staged_diff<T>(source: &[T], target: &[T]) -> StagedChangeset<Vec<T>>
where
    T: Differentiable + Clone,
{
    // Trivial when either snapshot is empty.
    if source.is_empty() || target.is_empty() {
        if source.is_empty() && target.is_empty() {
            return StagedChangeset::new();
        }

        let mut changeset = Changeset::new(target.to_vec());
        if source.is_empty() {
            changeset.element_inserted = (0..target.len())
                .map(|index| ElementPath::new(0, index))
                .collect();
        } else {
            changeset.element_deleted = (0..source.len())
                .map(|index| ElementPath::new(0, index))
                .collect();
        }
        return StagedChangeset::from_changesets(vec![changeset]);
    }

    let result = differentiate(source, target, false);

    // First stage keeps the source shape with matched content refreshed;
    // second stage compacts it down to the survivors.
    let mut first_stage = Vec::with_capacity(source.len());
    let mut second_stage = Vec::new();
    for (source_index, trace) in result.source_traces.iter().enumerate() {
        match trace.reference {
            Some(target_index) => {
                let element = target[target_index].clone();
                first_stage.push(element.clone());
                second_stage.push(element);
            }
            None => first_stage.push(source[source_index].clone()),
        }
    }

    let mut changesets = Vec::new();

    if !result.updated.is_empty() {
        let mut changeset = Changeset::new(first_stage);
        changeset.element_updated = result
            .updated
            .iter()
            .map(|&index| ElementPath::new(0, index))
            .collect();
        changesets.push(changeset);
    }

    if !result.deleted.is_empty() {
        let mut changeset = Changeset::new(second_stage);
        changeset.element_deleted = result
            .deleted
            .iter()
            .map(|&index| ElementPath::new(0, index))
            .collect();
        changesets.push(changeset);
    }

    if !result.inserted.is_empty() || !result.moved.is_empty() {
        let mut changeset = Changeset::new(target.to_vec());
        changeset.element_inserted = result
            .inserted
            .iter()
            .map(|&index| ElementPath::new(0, index))
            .collect();
        changeset.element_moved = result
            .moved
            .iter()
            .map(|moved| {
                let adjusted = moved.source - result.source_traces[moved.source].delete_offset;
                Move::new(ElementPath::new(0, adjusted), ElementPath::new(0, moved.target))
            })
            .collect();
        changesets.push(changeset);
    }

    // The last stage must present the target exactly.
    if let Some(last) = changesets.last_mut() {
        last.data = target.to_vec();
    }

    debug!(stages = changesets.len(), "computed flat staged changeset");
    StagedChangeset::from_changesets(changesets)
}
