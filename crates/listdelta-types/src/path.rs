//! Coordinate types for diff results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an element inside a sectioned snapshot.
///
/// Ordering is section-major: all paths in section 0 sort before all paths
/// in section 1, and within a section paths sort by element index. Batch
/// appliers rely on this to remove in descending and insert in ascending
/// coordinate order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ElementPath {
    /// Index of the containing section.
    pub section: usize,
    /// Index of the element within its section.
    pub element: usize,
}

impl ElementPath {
    /// Create a path from section and element indices.
    pub fn new(section: usize, element: usize) -> Self {
        Self { section, element }
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.section, self.element)
    }
}

/// A relocation of one entity from its position in the previous snapshot to
/// its position in the next.
///
/// The index type is `usize` for flat and section-level moves and
/// [`ElementPath`] for element-level moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move<I> {
    /// Position before the change.
    pub source: I,
    /// Position after the change.
    pub target: I,
}

impl<I> Move<I> {
    /// Create a move from a source and a target position.
    pub fn new(source: I, target: I) -> Self {
        Self { source, target }
    }
}

impl<I: fmt::Display> fmt::Display for Move<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let path = ElementPath::new(2, 5);
        assert_eq!(path.to_string(), "[2][5]");
        assert_eq!(Move::new(1usize, 3usize).to_string(), "1 -> 3");
        assert_eq!(
            Move::new(ElementPath::new(0, 1), ElementPath::new(1, 0)).to_string(),
            "[0][1] -> [1][0]"
        );
    }

    #[test]
    fn ordering_is_section_major() {
        let mut paths = vec![
            ElementPath::new(1, 0),
            ElementPath::new(0, 9),
            ElementPath::new(0, 2),
            ElementPath::new(1, 3),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![
                ElementPath::new(0, 2),
                ElementPath::new(0, 9),
                ElementPath::new(1, 0),
                ElementPath::new(1, 3),
            ]
        );
    }

    #[test]
    fn serde_roundtrip() {
        let moved = Move::new(ElementPath::new(0, 1), ElementPath::new(2, 0));
        let json = serde_json::to_string(&moved).unwrap();
        let parsed: Move<ElementPath> = serde_json::from_str(&json).unwrap();
        assert_eq!(moved, parsed);
    }
}
