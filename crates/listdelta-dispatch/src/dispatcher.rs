//! The dispatcher: owns the authoritative snapshot and drives staged
//! updates into a target.
//!
//! Every [`apply`](ListDispatcher::apply) call diffs the incoming snapshot
//! against the snapshot the dispatcher believes the target displays, then
//! hands the resulting stages over strictly in order. A target that is
//! detached, or that interrupts the sequence midway, is reloaded in full
//! instead; either way the dispatcher's snapshot ends up equal to the
//! incoming data.

use tracing::debug;

use listdelta_diff::staged_sectioned_diff;
use listdelta_types::DifferentiableSection;

use crate::error::ApplyError;
use crate::target::{StageDisposition, UpdateTarget};

/// How an [`apply`](ListDispatcher::apply) call was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshots were equal; nothing was dispatched.
    Unchanged,
    /// Every stage was applied in order.
    Staged { stages: usize },
    /// The target was reloaded wholesale, either because it was detached or
    /// because it interrupted the staged sequence.
    FullReload,
}

/// Dispatches snapshot updates to an [`UpdateTarget`] as staged changesets.
#[derive(Clone, Debug)]
pub struct ListDispatcher<S> {
    current: Vec<S>,
}

impl<S> ListDispatcher<S> {
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
        }
    }

    pub fn with_current(current: Vec<S>) -> Self {
        Self { current }
    }

    /// The snapshot the dispatcher believes the target displays.
    pub fn current(&self) -> &[S] {
        &self.current
    }
}

impl<S> Default for ListDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ListDispatcher<S>
where
    S: DifferentiableSection + Clone,
    S::Element: Clone,
{
    /// Diff `data` against the current snapshot and drive the target.
    ///
    /// After a successful call the dispatcher's snapshot equals `data`,
    /// regardless of whether the update was staged or reloaded.
    pub fn apply<T>(&mut self, target: &mut T, data: Vec<S>) -> Result<ApplyOutcome, ApplyError>
    where
        T: UpdateTarget<Section = S>,
    {
        if !target.is_attached() {
            debug!("target detached, reloading in full");
            target.reload_all(data.clone())?;
            self.current = data;
            return Ok(ApplyOutcome::FullReload);
        }

        let staged = staged_sectioned_diff(&self.current, &data);
        if staged.is_empty() {
            self.current = data;
            return Ok(ApplyOutcome::Unchanged);
        }

        let stages = staged.len();
        for changeset in staged {
            match target.apply_stage(&changeset)? {
                StageDisposition::Continue => {
                    self.current = changeset.data;
                }
                StageDisposition::Interrupt => {
                    debug!("staged sequence interrupted, reloading in full");
                    target.reload_all(data.clone())?;
                    self.current = data;
                    return Ok(ApplyOutcome::FullReload);
                }
            }
        }

        debug!(stages, "dispatched staged update");
        self.current = data;
        Ok(ApplyOutcome::Staged { stages })
    }
}
