//! The consumer contract for staged updates.

use listdelta_diff::Changeset;
use listdelta_types::DifferentiableSection;

use crate::error::ApplyError;

/// A target's verdict on one applied stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageDisposition {
    /// The stage was absorbed; the next one may follow.
    Continue,
    /// The target can no longer follow the staged sequence. The dispatcher
    /// abandons the remaining stages and reloads the target in full.
    Interrupt,
}

/// An attachable consumer of staged updates.
///
/// Stages arrive strictly in order: `apply_stage` for stage `n + 1` is only
/// called after stage `n` returned [`StageDisposition::Continue`]. Between
/// those calls the target's visible state must equal the previous stage's
/// `data`, or the incoming operations will not line up.
pub trait UpdateTarget {
    /// Section type this target renders.
    type Section: DifferentiableSection;

    /// Whether the target can currently take incremental updates. A detached
    /// target receives one full reload instead of a staged sequence.
    fn is_attached(&self) -> bool;

    /// Replace the entire content with `data` in one step.
    fn reload_all(&mut self, data: Vec<Self::Section>) -> Result<(), ApplyError>;

    /// Apply one stage of a staged changeset.
    fn apply_stage(
        &mut self,
        changeset: &Changeset<Vec<Self::Section>>,
    ) -> Result<StageDisposition, ApplyError>;
}
