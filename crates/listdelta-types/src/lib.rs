//! Foundation types for listdelta.
//!
//! This crate defines the contract that diffable data must satisfy and the
//! coordinate types that diff results are expressed in. The algorithm crates
//! build on these without knowing anything about the concrete data.
//!
//! # Key Types
//!
//! - [`Differentiable`] - identity and content-equality contract for elements
//! - [`DifferentiableSection`] - a diffable section header plus its elements
//! - [`ElementPath`] - (section, element) position inside a sectioned snapshot
//! - [`Move`] - a source/target position pair for one relocated entity
//! - [`ArraySection`] - the standard model-plus-elements section container

pub mod differentiable;
pub mod path;
pub mod section;

pub use differentiable::{Differentiable, DifferentiableSection};
pub use path::{ElementPath, Move};
pub use section::ArraySection;
