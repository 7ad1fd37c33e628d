//! Apply-side adapter for listdelta: computes staged diffs and drives them
//! into an attachable consumer, one stage at a time.
//!
//! [`ListDispatcher`] owns the snapshot it last delivered. On each
//! [`apply`](ListDispatcher::apply) it diffs the incoming snapshot against
//! that one and hands the stages to an [`UpdateTarget`] strictly in order.
//! Targets that cannot follow, because they are detached or interrupted the
//! sequence, get a single full reload instead, so their state never drifts.
//!
//! # Key Types
//!
//! - [`ListDispatcher`] - snapshot owner and stage driver
//! - [`UpdateTarget`] - the consumer contract
//! - [`InMemoryTarget`] - a vector-backed consumer for tests and shadowing
//! - [`ApplyError`] - index errors from applying a changeset

pub mod dispatcher;
pub mod error;
pub mod mirror;
pub mod target;

pub use dispatcher::{ApplyOutcome, ListDispatcher};
pub use error::ApplyError;
pub use mirror::{apply_changeset, InMemoryTarget};
pub use target::{StageDisposition, UpdateTarget};
