//! Named shapes and the shape resolver.
//!
//! Shapes are defined on the logical 5×7 block grid produced by the default
//! layout. Block ids run row-major:
//!
//! ```text
//!  0  1  2  3  4
//!  5  6  7  8  9
//! 10 11 12 13 14
//! 15 16 17 18 19
//! 20 21 22 23 24
//! 25 26 27 28 29
//! 30 31 32 33 34
//! ```
//!
//! The reserved [`NONE`] shape always exists and maps to the empty set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::ShapeError;

/// Name of the reserved shape that highlights nothing.
pub const NONE: &str = "none";

/// Set of block ids forming one shape.
pub type BlockIds = BTreeSet<usize>;

/// Built-in shape catalogue: `(name, block ids)`.
const DEFAULT_SHAPES: [(&str, &[usize]); 13] = [
    ("circle", &[7, 11, 12, 13, 16, 17, 18, 21, 22, 23, 27]),
    ("filled_square", &[11, 12, 13, 16, 17, 18, 21, 22, 23]),
    ("hollow_square", &[11, 12, 13, 16, 18, 21, 22, 23]),
    ("cross", &[7, 12, 16, 17, 18, 22, 27]),
    ("x_shape", &[7, 9, 11, 13, 17, 21, 23, 25, 27]),
    ("h_shape", &[11, 13, 16, 17, 18, 21, 23]),
    ("arrow_up", &[6, 7, 8, 12, 17, 22, 27]),
    ("arrow_down", &[7, 12, 17, 22, 26, 27, 28]),
    ("horizontal_line", &[15, 16, 17, 18, 19]),
    ("vertical_line", &[2, 7, 12, 17, 22, 27, 32]),
    // Centered on block 27
    ("hollow_square_left", &[21, 22, 23, 26, 28, 31, 32, 33]),
    // Centered on block 7
    ("hollow_square_right", &[1, 2, 3, 6, 8, 11, 12, 13]),
    (
        "double_hollow_square",
        &[1, 2, 3, 6, 8, 11, 12, 13, 21, 22, 23, 26, 28, 31, 32, 33],
    ),
];

/// Read-only mapping from shape name to the block ids it highlights.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, BlockIds>")]
pub struct ShapeSet {
    shapes: BTreeMap<String, BlockIds>,
    empty: BlockIds,
}

impl ShapeSet {
    /// Shape set holding only [`NONE`].
    pub fn empty() -> Self {
        Self::from(BTreeMap::new())
    }

    /// Resolve a shape name to its block ids.
    ///
    /// [`NONE`] resolves to the empty set. Unknown names return
    /// [`ShapeError::Unknown`]; callers fall back to [`ShapeSet::none`].
    pub fn resolve(&self, name: &str) -> Result<&BlockIds, ShapeError> {
        self.shapes.get(name).ok_or_else(|| ShapeError::Unknown(name.to_owned()))
    }

    /// The empty id set used for [`NONE`] and as the unknown-shape fallback.
    #[inline]
    pub const fn none(&self) -> &BlockIds {
        &self.empty
    }

    /// Whether `name` is a configured shape (including [`NONE`]).
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Shape names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Number of shapes, counting [`NONE`].
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false: [`NONE`] is always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Add or replace a shape. Redefining [`NONE`] is ignored.
    pub fn insert(&mut self, name: impl Into<String>, ids: impl IntoIterator<Item = usize>) {
        let name = name.into();
        if name == NONE {
            log::warn!("Ignoring attempt to redefine reserved shape '{NONE}'");
            return;
        }
        self.shapes.insert(name, ids.into_iter().collect());
    }
}

impl From<BTreeMap<String, BlockIds>> for ShapeSet {
    fn from(mut shapes: BTreeMap<String, BlockIds>) -> Self {
        // "none" is reserved and always empty
        shapes.insert(NONE.to_owned(), BlockIds::new());
        Self {
            shapes,
            empty: BlockIds::new(),
        }
    }
}

impl Default for ShapeSet {
    fn default() -> Self {
        let shapes = DEFAULT_SHAPES
            .iter()
            .map(|(name, ids)| ((*name).to_owned(), ids.iter().copied().collect()))
            .collect::<BTreeMap<_, _>>();
        Self::from(shapes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue() {
        let shapes = ShapeSet::default();
        assert_eq!(shapes.len(), 14, "13 built-in shapes plus 'none'");
        assert!(shapes.contains("double_hollow_square"));
        assert!(shapes.contains(NONE));
    }

    #[test]
    fn test_resolve_known_shape() {
        let shapes = ShapeSet::default();
        let cross = shapes.resolve("cross").unwrap();
        let expected: BlockIds = [7, 12, 16, 17, 18, 22, 27].into_iter().collect();
        assert_eq!(cross, &expected);
    }

    #[test]
    fn test_resolve_none_is_empty() {
        let shapes = ShapeSet::default();
        assert!(shapes.resolve(NONE).unwrap().is_empty(), "'none' should resolve to the empty set");
    }

    #[test]
    fn test_resolve_unknown_shape() {
        let shapes = ShapeSet::default();
        assert_eq!(
            shapes.resolve("triangle"),
            Err(ShapeError::Unknown("triangle".to_owned()))
        );
        assert!(shapes.none().is_empty(), "Fallback set should be empty");
    }

    #[test]
    fn test_none_cannot_be_redefined() {
        let mut shapes = ShapeSet::empty();
        shapes.insert(NONE, [1, 2, 3]);
        assert!(shapes.resolve(NONE).unwrap().is_empty());

        let mut raw = BTreeMap::new();
        raw.insert(NONE.to_owned(), [4].into_iter().collect());
        let shapes = ShapeSet::from(raw);
        assert!(shapes.resolve(NONE).unwrap().is_empty(), "Loaded 'none' should be forced empty");
    }

    #[test]
    fn test_insert_deduplicates_ids() {
        let mut shapes = ShapeSet::empty();
        shapes.insert("dot", [5, 5, 5]);
        assert_eq!(shapes.resolve("dot").unwrap().len(), 1, "Ids are a set");
    }

    #[test]
    fn test_deserialize_adds_none() {
        let shapes: ShapeSet = serde_json::from_str(r#"{"corner": [0, 4, 30, 34]}"#).unwrap();
        assert_eq!(shapes.len(), 2);
        assert!(shapes.contains(NONE));
        assert_eq!(shapes.resolve("corner").unwrap().len(), 4);
    }
}
