//! Sectioned diff: two-level comparison with five-phase changeset staging.
//!
//! Sections are matched first, by their own identifiers, using the same
//! matching pass as the flat algorithm. Elements are then matched through a
//! single occurrence table built over every source element across all
//! sections, which is what lets an element surface in a different section of
//! the target and still be recognized as the same entity.
//!
//! The edit script is replayed in five canonical phases, each emitted as one
//! changeset when non-empty:
//!
//! 1. element content updates
//! 2. section deletions and element deletions
//! 3. section insertions and section moves
//! 4. element insertions and element moves
//! 5. section content updates
//!
//! # Invariants
//!
//! - Every stage's operations are valid against the previous stage's data,
//!   and applying them yields exactly this stage's data.
//! - Deletions and updates use pre-stage coordinates; insertions use
//!   post-stage coordinates; move sources are remapped past prior deletions.
//! - Sections inserted in phase 3 enter with an empty element list; their
//!   elements arrive as phase 4 insertions, so phase 3 stays purely
//!   structural.
//! - Elements of a deleted section are carried out by the section deletion
//!   alone and are never reported individually.
//! - The final stage's data equals the target snapshot exactly.

use tracing::debug;

use listdelta_types::{Differentiable, DifferentiableSection, ElementPath, Move};

use crate::changeset::{Changeset, StagedChangeset};
use crate::flat::{differentiate, Trace};
use crate::occurrence::OccurrenceTable;

/// Compare two sectioned snapshots and stage the edit script.
pub fn staged_sectioned_diff<S>(source: &[S], target: &[S]) -> StagedChangeset<Vec<S>>
where
    S: DifferentiableSection + Clone,
    S::Element: Clone,
{
    // Section-level matching. Updates are tracked at target indices because
    // the section-update stage runs after the structure is final.
    let section_result = differentiate(source, target, true);

    // Element-level matching over all sections at once.
    let mut element_traces: Vec<Vec<Trace<ElementPath>>> = source
        .iter()
        .map(|section| vec![Trace::default(); section.elements().len()])
        .collect();
    let mut target_element_references: Vec<Vec<Option<ElementPath>>> = target
        .iter()
        .map(|section| vec![None; section.elements().len()])
        .collect();

    let mut flatten_source_paths = Vec::new();
    for (section_index, section) in source.iter().enumerate() {
        for element_index in 0..section.elements().len() {
            flatten_source_paths.push(ElementPath::new(section_index, element_index));
        }
    }

    let mut table = OccurrenceTable::new(flatten_source_paths.iter().map(|path| {
        source[path.section].elements()[path.element].difference_identifier()
    }));

    for (target_section_index, target_section) in target.iter().enumerate() {
        for (target_element_index, element) in target_section.elements().iter().enumerate() {
            if let Some(flatten_index) = table.claim(&element.difference_identifier()) {
                let source_path = flatten_source_paths[flatten_index];
                let target_path = ElementPath::new(target_section_index, target_element_index);
                target_element_references[target_path.section][target_path.element] =
                    Some(source_path);
                element_traces[source_path.section][source_path.element].reference =
                    Some(target_path);
            }
        }
    }

    // Deletion pass over surviving source sections. An element survives only
    // if it matched and the target section it landed in is itself a matched
    // section; a match into a freshly inserted section degrades to a
    // deletion here and an insertion in phase 4. Elements of deleted source
    // sections are skipped entirely.
    let mut element_deleted = Vec::new();
    let mut first_stage_sections: Vec<S> = source.to_vec();
    let mut second_stage_sections: Vec<S> = Vec::new();

    for (source_section_index, source_section) in source.iter().enumerate() {
        if section_result.source_traces[source_section_index]
            .reference
            .is_none()
        {
            continue;
        }

        let source_elements = source_section.elements();
        let mut first_stage_elements = Vec::with_capacity(source_elements.len());
        let mut second_stage_elements = Vec::new();
        let mut offset_by_delete = 0;

        for (source_element_index, source_element) in source_elements.iter().enumerate() {
            let source_path = ElementPath::new(source_section_index, source_element_index);
            element_traces[source_section_index][source_element_index].delete_offset =
                offset_by_delete;

            let surviving_target = element_traces[source_section_index][source_element_index]
                .reference
                .filter(|target_path| {
                    section_result.target_references[target_path.section].is_some()
                });

            match surviving_target {
                Some(target_path) => {
                    let target_element =
                        target[target_path.section].elements()[target_path.element].clone();
                    first_stage_elements.push(target_element.clone());
                    second_stage_elements.push(target_element);
                }
                None => {
                    first_stage_elements.push(source_element.clone());
                    element_deleted.push(source_path);
                    element_traces[source_section_index][source_element_index].is_tracked = true;
                    offset_by_delete += 1;
                }
            }
        }

        let first_stage_section = source_section.with_elements(first_stage_elements);
        first_stage_sections[source_section_index] = first_stage_section;
        second_stage_sections.push(source_section.with_elements(second_stage_elements));
    }

    // Target pass: build the structural and element stages together.
    let mut element_inserted = Vec::new();
    let mut element_updated = Vec::new();
    let mut element_moved = Vec::new();

    let mut third_stage_sections: Vec<S> = Vec::with_capacity(target.len());
    let mut fourth_stage_sections: Vec<S> = Vec::with_capacity(target.len());

    for (target_section_index, target_section) in target.iter().enumerate() {
        let target_elements = target_section.elements();

        // An inserted section enters the structure stage empty; every one of
        // its elements is reported as an insertion in phase 4.
        let source_section_index = match section_result.target_references[target_section_index] {
            Some(index) => index,
            None => {
                third_stage_sections.push(target_section.with_elements(Vec::new()));
                fourth_stage_sections.push(target_section.clone());
                for target_element_index in 0..target_elements.len() {
                    element_inserted
                        .push(ElementPath::new(target_section_index, target_element_index));
                }
                continue;
            }
        };

        let section_delete_offset =
            section_result.source_traces[source_section_index].delete_offset;
        let previous_section =
            second_stage_sections[source_section_index - section_delete_offset].clone();

        let mut fourth_stage_elements = Vec::with_capacity(target_elements.len());
        let mut untracked_source_index = Some(0);

        for (target_element_index, target_element) in target_elements.iter().enumerate() {
            untracked_source_index = untracked_source_index.and_then(|index| {
                element_traces[source_section_index][index..]
                    .iter()
                    .position(|trace| !trace.is_tracked)
                    .map(|found| index + found)
            });

            let target_path = ElementPath::new(target_section_index, target_element_index);
            fourth_stage_elements.push(target_element.clone());

            let source_path = match target_element_references[target_section_index]
                [target_element_index]
            {
                Some(path) => path,
                None => {
                    element_inserted.push(target_path);
                    continue;
                }
            };

            // A match whose source section was deleted arrives as an
            // insertion; the section deletion already carried it out.
            let moved_source_section_index =
                match section_result.source_traces[source_path.section].reference {
                    Some(index) => index,
                    None => {
                        element_inserted.push(target_path);
                        continue;
                    }
                };

            element_traces[source_path.section][source_path.element].is_tracked = true;

            let source_element = &source[source_path.section].elements()[source_path.element];
            if !target_element.is_content_equal(source_element) {
                element_updated.push(source_path);
            }

            // Moved if it came from another section, or broke relative order
            // within its own. The move source is expressed in phase-3
            // coordinates: the section at its target position, the element
            // remapped past deletions.
            if source_path.section != source_section_index
                || Some(source_path.element) != untracked_source_index
            {
                let delete_offset =
                    element_traces[source_path.section][source_path.element].delete_offset;
                element_moved.push(Move::new(
                    ElementPath::new(
                        moved_source_section_index,
                        source_path.element - delete_offset,
                    ),
                    target_path,
                ));
            }
        }

        let fourth_stage_section = previous_section.with_elements(fourth_stage_elements);
        third_stage_sections.push(previous_section);
        fourth_stage_sections.push(fourth_stage_section);
    }

    // Emit the non-empty phases.
    let mut changesets = Vec::new();

    if !element_updated.is_empty() {
        let mut changeset = Changeset::new(first_stage_sections);
        changeset.element_updated = element_updated;
        changesets.push(changeset);
    }

    if !section_result.deleted.is_empty() || !element_deleted.is_empty() {
        let mut changeset = Changeset::new(second_stage_sections);
        changeset.section_deleted = section_result.deleted;
        changeset.element_deleted = element_deleted;
        changesets.push(changeset);
    }

    if !section_result.inserted.is_empty() || !section_result.moved.is_empty() {
        let mut changeset = Changeset::new(third_stage_sections);
        changeset.section_inserted = section_result.inserted;
        changeset.section_moved = section_result
            .moved
            .iter()
            .map(|moved| {
                let adjusted =
                    moved.source - section_result.source_traces[moved.source].delete_offset;
                Move::new(adjusted, moved.target)
            })
            .collect();
        changesets.push(changeset);
    }

    if !element_inserted.is_empty() || !element_moved.is_empty() {
        let mut changeset = Changeset::new(fourth_stage_sections);
        changeset.element_inserted = element_inserted;
        changeset.element_moved = element_moved;
        changesets.push(changeset);
    }

    if !section_result.updated.is_empty() {
        let mut changeset = Changeset::new(target.to_vec());
        changeset.section_updated = section_result.updated;
        changesets.push(changeset);
    }

    // The last stage must present the target exactly.
    if let Some(last) = changesets.last_mut() {
        last.data = target.to_vec();
    }

    debug!(
        stages = changesets.len(),
        "computed sectioned staged changeset"
    );
    StagedChangeset::from_changesets(changesets)
}
