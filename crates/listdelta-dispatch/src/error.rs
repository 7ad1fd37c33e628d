//! Errors surfaced while applying changeset operations to a target.

use thiserror::Error;

use listdelta_types::ElementPath;

/// A changeset operation referred to a position the current state does not
/// have. This indicates the changeset was produced against a different
/// snapshot than the one it is being applied to.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// A section operation referred past the end of the section list.
    #[error("section index {index} out of bounds (section count {len})")]
    SectionOutOfBounds { index: usize, len: usize },

    /// An element operation referred past the end of its section.
    #[error("element path {path} out of bounds (section has {len} elements)")]
    ElementOutOfBounds { path: ElementPath, len: usize },
}
