//! The identity and content-equality contract for diffable data.
//!
//! Two snapshots are compared entity-by-entity. An entity is whatever a
//! single identifier value denotes: the same identifier appearing in both
//! snapshots means the same entity survived, possibly with different content
//! or at a different position. Content equality is a separate, weaker
//! question and is only asked about values that were already paired by
//! identifier.

use std::hash::Hash;

/// A value that can participate in a diff.
///
/// `difference_identifier` pairs entities across snapshots. Equal identifiers
/// mean the same entity; unequal identifiers mean unrelated entities, however
/// similar their content. `is_content_equal` then decides whether a paired
/// entity counts as updated or unchanged.
///
/// Identifiers need not be unique within one snapshot. Duplicates are paired
/// positionally, first come first served in ascending index order, which
/// keeps the output deterministic.
pub trait Differentiable {
    /// Stable identity used to match entities across snapshots.
    type Identifier: Hash + Eq;

    /// The identity of this value.
    fn difference_identifier(&self) -> Self::Identifier;

    /// Whether this value's content equals `other`'s.
    ///
    /// Only consulted for values already paired by identifier.
    fn is_content_equal(&self, other: &Self) -> bool;
}

/// A diffable section: a differentiable header plus an ordered element list.
///
/// The [`Differentiable`] supertrait carries the section's own identity and
/// content, which should reflect the header only. Elements are diffed
/// individually by the sectioned algorithm and must not feed into the
/// section's content equality.
pub trait DifferentiableSection: Differentiable {
    /// Element type carried by the section.
    type Element: Differentiable;

    /// The ordered elements of this section.
    fn elements(&self) -> &[Self::Element];

    /// Rebuild this section, keeping its identity and header content, with a
    /// different element list.
    fn with_elements(&self, elements: Vec<Self::Element>) -> Self;
}

// ---------------------------------------------------------------
// Standard implementations
// ---------------------------------------------------------------

macro_rules! impl_differentiable_for_copy {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Differentiable for $ty {
                type Identifier = $ty;

                fn difference_identifier(&self) -> Self::Identifier {
                    *self
                }

                fn is_content_equal(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_differentiable_for_copy!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

impl Differentiable for String {
    type Identifier = String;

    fn difference_identifier(&self) -> Self::Identifier {
        self.clone()
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self == other
    }
}

impl Differentiable for str {
    type Identifier = String;

    fn difference_identifier(&self) -> Self::Identifier {
        self.to_owned()
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: Differentiable> Differentiable for Option<T> {
    type Identifier = Option<T::Identifier>;

    fn difference_identifier(&self) -> Self::Identifier {
        self.as_ref().map(|value| value.difference_identifier())
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.is_content_equal(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<'a, T: Differentiable + ?Sized> Differentiable for &'a T {
    type Identifier = T::Identifier;

    fn difference_identifier(&self) -> Self::Identifier {
        (**self).difference_identifier()
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        (**self).is_content_equal(other)
    }
}
