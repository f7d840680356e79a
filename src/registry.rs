//! Block and dot registry.
//!
//! Owns the blocks and dots produced by [`Layout`] and the per-block highlight
//! flags. Also keeps two persistent lists of dot indices, one per brightness
//! class, so the animation can sample each class without re-partitioning all
//! dots every frame:
//!
//! | List | Contains |
//! |------|----------|
//! | `high_dots` | dots whose block is highlighted |
//! | `low_dots` | dots whose block is not highlighted |
//!
//! The lists are rebuilt only when a highlight flag changes. Their order is
//! not meaningful; the sampler reorders them in place.

use crate::layout::{Block, Dot, Layout};
use crate::shapes::BlockIds;

/// Dots plus mutable index lists of both classes, borrowed together.
pub(crate) struct SamplingView<'a> {
    pub dots: &'a [Dot],
    pub high: &'a mut [usize],
    pub low: &'a mut [usize],
}

/// Blocks, dots and brightness-class partitions for one display.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    columns: u32,
    rows: u32,
    blocks: Vec<Block>,
    dots: Vec<Dot>,
    high_dots: Vec<usize>,
    low_dots: Vec<usize>,
}

impl BlockRegistry {
    /// Build the registry from a computed layout. All blocks start dim.
    pub fn from_layout(layout: Layout) -> Self {
        let mut registry = Self {
            columns: layout.columns,
            rows: layout.rows,
            blocks: layout.blocks,
            dots: layout.dots,
            high_dots: Vec::new(),
            low_dots: Vec::new(),
        };
        registry.rebuild_partitions();
        registry
    }

    /// Grid dimensions as `(columns, rows)`.
    #[inline]
    pub const fn grid_size(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Blocks in id order.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn block(&self, id: usize) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All dots in layout order.
    #[inline]
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    #[inline]
    pub fn dot(&self, index: usize) -> Option<&Dot> {
        self.dots.get(index)
    }

    /// Number of dots belonging to highlighted blocks.
    #[inline]
    pub fn high_dot_count(&self) -> usize {
        self.high_dots.len()
    }

    /// Number of dots belonging to non-highlighted blocks.
    #[inline]
    pub fn low_dot_count(&self) -> usize {
        self.low_dots.len()
    }

    /// Ids of all currently highlighted blocks.
    pub fn highlighted_ids(&self) -> BlockIds {
        self.blocks.iter().filter(|b| b.is_highlighted()).map(Block::id).collect()
    }

    /// Whether the block owning `dot` is highlighted.
    #[inline]
    pub fn is_dot_highlighted(&self, dot: &Dot) -> bool {
        self.blocks.get(dot.block_id).is_some_and(Block::is_highlighted)
    }

    /// Set every block's flag to its membership in `ids`.
    ///
    /// Returns the ids of blocks that went from highlighted to dim, in id
    /// order. Those need an immediate low-brightness redraw; blocks that became
    /// highlighted are left to the regular frame updates.
    pub fn apply_highlights(&mut self, ids: &BlockIds) -> Vec<usize> {
        let mut dimmed = Vec::new();
        let mut any_changed = false;

        for block in &mut self.blocks {
            let target = ids.contains(&block.id());
            if block.set_highlight(target) {
                any_changed = true;
                if !target {
                    dimmed.push(block.id());
                }
            }
        }

        if any_changed {
            self.rebuild_partitions();
        }
        dimmed
    }

    /// Split borrow for in-place sampling of both brightness classes.
    pub(crate) fn sampling_view(&mut self) -> SamplingView<'_> {
        SamplingView {
            dots: &self.dots,
            high: &mut self.high_dots,
            low: &mut self.low_dots,
        }
    }

    fn rebuild_partitions(&mut self) {
        self.high_dots.clear();
        self.low_dots.clear();
        for (index, dot) in self.dots.iter().enumerate() {
            let highlighted = self.blocks.get(dot.block_id).is_some_and(Block::is_highlighted);
            if highlighted {
                self.high_dots.push(index);
            } else {
                self.low_dots.push(index);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
