//! The standard section container.

use serde::{Deserialize, Serialize};

use crate::differentiable::{Differentiable, DifferentiableSection};

/// A section built from a header model plus an ordered element list.
///
/// The section's identity and content equality are those of the model alone.
/// The element list never feeds into section content equality; elements are
/// diffed individually by the sectioned algorithm.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySection<M, E> {
    /// Section header. Its identity is the section's identity.
    pub model: M,
    /// Ordered elements of the section.
    pub elements: Vec<E>,
}

impl<M, E> ArraySection<M, E> {
    /// Create a section from a header model and elements.
    pub fn new(model: M, elements: Vec<E>) -> Self {
        Self { model, elements }
    }
}

impl<M: Differentiable, E> Differentiable for ArraySection<M, E> {
    type Identifier = M::Identifier;

    fn difference_identifier(&self) -> Self::Identifier {
        self.model.difference_identifier()
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self.model.is_content_equal(&other.model)
    }
}

impl<M, E> DifferentiableSection for ArraySection<M, E>
where
    M: Differentiable + Clone,
    E: Differentiable,
{
    type Element = E;

    fn elements(&self) -> &[E] {
        &self.elements
    }

    fn with_elements(&self, elements: Vec<E>) -> Self {
        Self {
            model: self.model.clone(),
            elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(model: &str, elements: &[&str]) -> ArraySection<String, String> {
        ArraySection::new(
            model.to_owned(),
            elements.iter().map(|e| (*e).to_owned()).collect(),
        )
    }

    #[test]
    fn identity_comes_from_the_model() {
        let a = section("news", &["x"]);
        let b = section("news", &["y", "z"]);
        assert_eq!(a.difference_identifier(), b.difference_identifier());
        assert_ne!(
            a.difference_identifier(),
            section("sport", &[]).difference_identifier()
        );
    }

    #[test]
    fn content_equality_ignores_elements() {
        let a = section("news", &["x"]);
        let b = section("news", &["y", "z"]);
        assert!(a.is_content_equal(&b));
    }

    #[test]
    fn with_elements_keeps_the_model() {
        let a = section("news", &["x"]);
        let rebuilt = a.with_elements(vec!["p".to_owned(), "q".to_owned()]);
        assert_eq!(rebuilt.model, "news");
        assert_eq!(rebuilt.elements, vec!["p", "q"]);
        assert!(a.is_content_equal(&rebuilt));
    }

    #[test]
    fn serde_roundtrip() {
        let a = section("news", &["x", "y"]);
        let json = serde_json::to_string(&a).unwrap();
        let parsed: ArraySection<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(a, parsed);
    }
}
