//! Diff engine for listdelta: flat and sectioned snapshot comparison with
//! staged changeset output.
//!
//! The flat entry points compare two ordered snapshots of entities
//! implementing [`Differentiable`](listdelta_types::Differentiable) and
//! report deletions, insertions, content updates and moves. The sectioned
//! entry point compares two-level snapshots and stages the edit script into
//! up to five changesets, each safe to hand to an index-based consumer in
//! order.
//!
//! # Key Types
//!
//! - [`DiffResult`] - the raw outcome of a flat comparison
//! - [`Changeset`] - one stage of an edit script plus the data it yields
//! - [`StagedChangeset`] - the ordered stages of a sectioned or flat diff
//!
//! # Example
//!
//! ```
//! use listdelta_diff::diff;
//!
//! let source = vec!["apple".to_owned(), "pear".to_owned()];
//! let target = vec!["pear".to_owned(), "plum".to_owned()];
//!
//! let result = diff(&source, &target);
//! assert_eq!(result.deleted, vec![0]);
//! assert_eq!(result.inserted, vec![1]);
//! ```

pub mod changeset;
pub mod flat;
pub mod sectioned;

mod occurrence;

pub use changeset::{Changeset, StagedChangeset};
pub use flat::{diff, staged_diff, DiffResult};
pub use sectioned::staged_sectioned_diff;
