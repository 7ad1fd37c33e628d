//! Index-based changeset application against plain vectors.
//!
//! [`apply_changeset`] replays one stage the way a batching view consumer
//! would: content updates first, then removals in descending index order,
//! then insertions in ascending index order, with moves decomposed into a
//! capture, a removal and an insertion. Deletions and updates are interpreted
//! in pre-stage coordinates, insertions and move targets in post-stage
//! coordinates.
//!
//! [`InMemoryTarget`] wraps this into an [`UpdateTarget`] suitable for tests
//! and for shadowing a real consumer.
//!
//! # Invariants
//!
//! - On error the state is left untouched; all work happens on a scratch
//!   copy that is only written back after every operation landed.
//! - Applying a stage produced by the diff engine yields exactly that
//!   stage's `data`.

use listdelta_diff::Changeset;
use listdelta_types::{DifferentiableSection, ElementPath};

use crate::error::ApplyError;
use crate::target::{StageDisposition, UpdateTarget};

type Scratch<S> = (S, Vec<<S as DifferentiableSection>::Element>);

fn element_in<S: DifferentiableSection>(
    data: &[S],
    path: ElementPath,
) -> Result<&S::Element, ApplyError> {
    let section = data.get(path.section).ok_or(ApplyError::SectionOutOfBounds {
        index: path.section,
        len: data.len(),
    })?;
    let elements = section.elements();
    elements.get(path.element).ok_or(ApplyError::ElementOutOfBounds {
        path,
        len: elements.len(),
    })
}

/// Apply one stage of a staged changeset to `sections`.
///
/// Content for updates and insertions is taken from `changeset.data` at the
/// operation's own coordinates, so the changeset must be applied against the
/// exact state it was produced for.
pub fn apply_changeset<S>(
    sections: &mut Vec<S>,
    changeset: &Changeset<Vec<S>>,
) -> Result<(), ApplyError>
where
    S: DifferentiableSection + Clone,
    S::Element: Clone,
{
    let mut work: Vec<Scratch<S>> = sections
        .iter()
        .map(|section| (section.clone(), section.elements().to_vec()))
        .collect();

    // Element content updates, at pre-stage coordinates.
    for &path in &changeset.element_updated {
        let content = element_in(&changeset.data, path)?.clone();
        let len = work.len();
        let entry = work.get_mut(path.section).ok_or(ApplyError::SectionOutOfBounds {
            index: path.section,
            len,
        })?;
        let elements_len = entry.1.len();
        let slot = entry.1.get_mut(path.element).ok_or(ApplyError::ElementOutOfBounds {
            path,
            len: elements_len,
        })?;
        *slot = content;
    }

    // Section content updates replace the whole section from the stage data.
    for &index in &changeset.section_updated {
        let section = changeset.data.get(index).ok_or(ApplyError::SectionOutOfBounds {
            index,
            len: changeset.data.len(),
        })?;
        let len = work.len();
        let slot = work.get_mut(index).ok_or(ApplyError::SectionOutOfBounds { index, len })?;
        *slot = (section.clone(), section.elements().to_vec());
    }

    // Capture moving elements before any index shifts.
    let mut moved_elements = Vec::with_capacity(changeset.element_moved.len());
    for moved in &changeset.element_moved {
        let source = moved.source;
        let entry = work.get(source.section).ok_or(ApplyError::SectionOutOfBounds {
            index: source.section,
            len: work.len(),
        })?;
        let element = entry.1.get(source.element).ok_or(ApplyError::ElementOutOfBounds {
            path: source,
            len: entry.1.len(),
        })?;
        moved_elements.push((moved.target, element.clone()));
    }

    // Remove deleted elements and move sources, descending so earlier
    // removals cannot shift later ones.
    let mut element_removals: Vec<ElementPath> = changeset.element_deleted.clone();
    element_removals.extend(changeset.element_moved.iter().map(|moved| moved.source));
    element_removals.sort_unstable_by(|a, b| b.cmp(a));
    for path in element_removals {
        let len = work.len();
        let entry = work.get_mut(path.section).ok_or(ApplyError::SectionOutOfBounds {
            index: path.section,
            len,
        })?;
        if path.element >= entry.1.len() {
            return Err(ApplyError::ElementOutOfBounds {
                path,
                len: entry.1.len(),
            });
        }
        entry.1.remove(path.element);
    }

    // Capture moving sections, then remove them and the deleted ones.
    let mut moved_sections = Vec::with_capacity(changeset.section_moved.len());
    for moved in &changeset.section_moved {
        let entry = work.get(moved.source).ok_or(ApplyError::SectionOutOfBounds {
            index: moved.source,
            len: work.len(),
        })?;
        moved_sections.push((moved.target, entry.clone()));
    }

    let mut section_removals: Vec<usize> = changeset.section_deleted.clone();
    section_removals.extend(changeset.section_moved.iter().map(|moved| moved.source));
    section_removals.sort_unstable_by(|a, b| b.cmp(a));
    for index in section_removals {
        if index >= work.len() {
            return Err(ApplyError::SectionOutOfBounds {
                index,
                len: work.len(),
            });
        }
        work.remove(index);
    }

    // Insert sections at their post-stage positions, ascending.
    let mut section_insertions: Vec<(usize, Scratch<S>)> = Vec::new();
    for &index in &changeset.section_inserted {
        let section = changeset.data.get(index).ok_or(ApplyError::SectionOutOfBounds {
            index,
            len: changeset.data.len(),
        })?;
        section_insertions.push((index, (section.clone(), section.elements().to_vec())));
    }
    section_insertions.extend(moved_sections);
    section_insertions.sort_unstable_by_key(|(index, _)| *index);
    for (index, entry) in section_insertions {
        if index > work.len() {
            return Err(ApplyError::SectionOutOfBounds {
                index,
                len: work.len(),
            });
        }
        work.insert(index, entry);
    }

    // Insert elements at their post-stage paths, ascending.
    let mut element_insertions: Vec<(ElementPath, S::Element)> = Vec::new();
    for &path in &changeset.element_inserted {
        element_insertions.push((path, element_in(&changeset.data, path)?.clone()));
    }
    element_insertions.extend(moved_elements);
    element_insertions.sort_unstable_by_key(|(path, _)| *path);
    for (path, element) in element_insertions {
        let len = work.len();
        let entry = work.get_mut(path.section).ok_or(ApplyError::SectionOutOfBounds {
            index: path.section,
            len,
        })?;
        if path.element > entry.1.len() {
            return Err(ApplyError::ElementOutOfBounds {
                path,
                len: entry.1.len(),
            });
        }
        entry.1.insert(path.element, element);
    }

    *sections = work
        .into_iter()
        .map(|(section, elements)| section.with_elements(elements))
        .collect();
    Ok(())
}

/// An in-memory consumer mirroring the staged protocol with plain vectors.
///
/// Counters record how the dispatcher drove it, which is what the tests
/// assert on. `interrupt_after` simulates a consumer that stops following
/// the sequence, for example because a newer snapshot superseded it.
#[derive(Clone, Debug)]
pub struct InMemoryTarget<S> {
    sections: Vec<S>,
    attached: bool,
    interrupt_after: Option<usize>,
    stages_applied: usize,
    full_reloads: usize,
}

impl<S> InMemoryTarget<S> {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            attached: true,
            interrupt_after: None,
            stages_applied: 0,
            full_reloads: 0,
        }
    }

    /// A target that starts out unable to take incremental updates.
    pub fn detached() -> Self {
        Self {
            attached: false,
            ..Self::new()
        }
    }

    pub fn with_sections(sections: Vec<S>) -> Self {
        Self {
            sections,
            ..Self::new()
        }
    }

    pub fn sections(&self) -> &[S] {
        &self.sections
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Interrupt the staged sequence once `count` stages have been applied.
    pub fn interrupt_after(&mut self, count: usize) {
        self.interrupt_after = Some(count);
    }

    pub fn stages_applied(&self) -> usize {
        self.stages_applied
    }

    pub fn full_reloads(&self) -> usize {
        self.full_reloads
    }
}

impl<S> Default for InMemoryTarget<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> UpdateTarget for InMemoryTarget<S>
where
    S: DifferentiableSection + Clone,
    S::Element: Clone,
{
    type Section = S;

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn reload_all(&mut self, data: Vec<S>) -> Result<(), ApplyError> {
        self.sections = data;
        self.full_reloads += 1;
        Ok(())
    }

    fn apply_stage(
        &mut self,
        changeset: &Changeset<Vec<S>>,
    ) -> Result<StageDisposition, ApplyError> {
        if self.interrupt_after.map_or(false, |limit| self.stages_applied >= limit) {
            return Ok(StageDisposition::Interrupt);
        }

        apply_changeset(&mut self.sections, changeset)?;
        self.stages_applied += 1;
        Ok(StageDisposition::Continue)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use listdelta_diff::staged_sectioned_diff;
    use listdelta_types::{ArraySection, Differentiable};

    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Header {
        id: u8,
        rev: u8,
    }

    impl Differentiable for Header {
        type Identifier = u8;

        fn difference_identifier(&self) -> u8 {
            self.id
        }

        fn is_content_equal(&self, other: &Self) -> bool {
            self.rev == other.rev
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Entry {
        id: u8,
        body: u8,
    }

    impl Differentiable for Entry {
        type Identifier = u8;

        fn difference_identifier(&self) -> u8 {
            self.id
        }

        fn is_content_equal(&self, other: &Self) -> bool {
            self.body == other.body
        }
    }

    type Section = ArraySection<Header, Entry>;

    fn sec(id: u8, elements: &[u8]) -> Section {
        ArraySection::new(
            Header { id, rev: 0 },
            elements.iter().map(|&id| Entry { id, body: 0 }).collect(),
        )
    }

    #[test]
    fn staged_stages_apply_in_order() {
        let source = vec![sec(1, &[10]), sec(2, &[11, 12])];
        let target = vec![sec(2, &[12]), sec(1, &[10, 13])];

        let staged = staged_sectioned_diff(&source, &target);
        let mut mirror = source.clone();
        for changeset in &staged {
            apply_changeset(&mut mirror, changeset).unwrap();
            assert_eq!(&mirror, &changeset.data);
        }
        assert_eq!(mirror, target);
    }

    #[test]
    fn cross_section_move_round_trips() {
        let source = vec![sec(1, &[10]), sec(2, &[])];
        let target = vec![sec(1, &[]), sec(2, &[10])];

        let staged = staged_sectioned_diff(&source, &target);
        let mut mirror = source.clone();
        for changeset in &staged {
            apply_changeset(&mut mirror, changeset).unwrap();
        }
        assert_eq!(mirror, target);
    }

    #[test]
    fn section_update_replaces_the_header() {
        let source = vec![sec(1, &[10])];
        let target = vec![ArraySection::new(
            Header { id: 1, rev: 3 },
            vec![Entry { id: 10, body: 0 }],
        )];

        let staged = staged_sectioned_diff(&source, &target);
        let mut mirror = source.clone();
        for changeset in &staged {
            apply_changeset(&mut mirror, changeset).unwrap();
        }
        assert_eq!(mirror, target);
    }

    #[test]
    fn out_of_bounds_operations_are_rejected() {
        let initial = vec![sec(1, &[10])];

        let mut sections = initial.clone();
        let mut changeset = Changeset::new(initial.clone());
        changeset.section_updated = vec![3];
        assert_eq!(
            apply_changeset(&mut sections, &changeset),
            Err(ApplyError::SectionOutOfBounds { index: 3, len: 1 })
        );
        // The state stays untouched after a failed apply.
        assert_eq!(sections, initial);

        let mut changeset = Changeset::new(initial.clone());
        changeset.element_deleted = vec![ElementPath::new(0, 5)];
        assert_eq!(
            apply_changeset(&mut sections, &changeset),
            Err(ApplyError::ElementOutOfBounds {
                path: ElementPath::new(0, 5),
                len: 1,
            })
        );
        assert_eq!(sections, initial);
    }

    fn section_strategy() -> impl Strategy<Value = Section> {
        (
            0u8..5,
            0u8..3,
            proptest::collection::vec((0u8..6, 0u8..3), 0..6),
        )
            .prop_map(|(id, rev, elements)| {
                ArraySection::new(
                    Header { id, rev },
                    elements
                        .into_iter()
                        .map(|(id, body)| Entry { id, body })
                        .collect(),
                )
            })
    }

    fn snapshot_strategy() -> impl Strategy<Value = Vec<Section>> {
        proptest::collection::vec(section_strategy(), 0..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2048))]

        #[test]
        fn applying_every_stage_reproduces_the_target(
            source in snapshot_strategy(),
            target in snapshot_strategy(),
        ) {
            let staged = staged_sectioned_diff(&source, &target);
            let mut mirror = source.clone();
            for changeset in &staged {
                let applied = apply_changeset(&mut mirror, changeset);
                prop_assert!(applied.is_ok(), "apply failed: {:?}", applied);
                prop_assert_eq!(&mirror, &changeset.data);
            }
            prop_assert_eq!(mirror, target);
        }
    }
}
