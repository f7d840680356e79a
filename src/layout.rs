//! Layout calculator: maps the logical block grid onto canvas pixels.
//!
//! # Geometry
//!
//! Blocks are sized in *logical* dots (`block_size` dots per side, spaced
//! `dot_spacing` apart, each [`LOGICAL_DOT_SIZE`] pixels wide), but each block
//! is drawn as four larger *super dots* arranged 2×2 around the block center:
//!
//! ```text
//!            block_pixel_dimension        gap
//!   ├──────────────────────────────────┤├─────┤
//!   ┌──────────────────────────────────┐       ┌──────
//!   │      ┌────┐        ┌────┐        │       │
//!   │      │ 0  │        │ 1  │        │       │
//!   │      └────┘   ×    └────┘        │       │   ...
//!   │      ┌────┐ center ┌────┐        │       │
//!   │      │ 2  │        │ 3  │        │       │
//!   │      └────┘        └────┘        │       │
//!   └──────────────────────────────────┘       └──────
//! ```
//!
//! The grid holds as many whole blocks as fit on each axis and is centered on
//! the canvas with integer padding. Blocks are numbered row-major from 0.
//! A super dot whose rectangle would leave the canvas is dropped, so blocks on
//! the edge of a tight canvas can hold fewer than four dots.
//!
//! The calculation is pure: no drawing happens here.

use embedded_graphics::prelude::Point;
use heapless::Vec as DotVec;

use crate::config::{DisplayConfig, LOGICAL_DOT_SIZE};

/// Maximum number of dots in a block (2×2 super dots).
pub const DOTS_PER_BLOCK: usize = 4;

/// Super dot sign pattern relative to the block center, in draw order.
const DOT_OFFSETS: [(i32, i32); DOTS_PER_BLOCK] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

// =============================================================================
// Dot / Block
// =============================================================================

/// One drawable super dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dot {
    /// Top-left pixel of the dot rectangle.
    pub top_left: Point,
    /// Id of the block this dot belongs to.
    pub block_id: usize,
}

/// A group of up to four dots; the unit of shape membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: usize,
    center: Point,
    highlighted: bool,
    dots: DotVec<Dot, DOTS_PER_BLOCK>,
}

impl Block {
    fn new(id: usize, center: Point) -> Self {
        Self {
            id,
            center,
            highlighted: false,
            dots: DotVec::new(),
        }
    }

    #[inline]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Block center, where the id label is drawn.
    #[inline]
    pub const fn center(&self) -> Point {
        self.center
    }

    /// Whether the block belongs to the active shape.
    #[inline]
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Member dots in creation order.
    #[inline]
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    /// Set the highlight flag. Returns `true` if it changed.
    pub(crate) fn set_highlight(&mut self, highlighted: bool) -> bool {
        let changed = self.highlighted != highlighted;
        self.highlighted = highlighted;
        changed
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Result of the layout calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Blocks per row.
    pub columns: u32,
    /// Blocks per column.
    pub rows: u32,
    /// Side length of one block in pixels.
    pub block_pixel_dimension: i32,
    /// Pixels between two adjacent blocks.
    pub gap_pixel_size: i32,
    /// Offset of the grid's top-left corner from the canvas origin.
    pub padding: Point,
    /// Blocks in id order.
    pub blocks: Vec<Block>,
    /// Every dot of every block, in creation order.
    pub dots: Vec<Dot>,
}

impl Layout {
    /// Compute block and dot positions for `config`.
    ///
    /// Oversized geometry saturates instead of overflowing: blocks that
    /// cannot fit yield an empty grid, dots that cannot fit are dropped.
    pub fn compute(config: &DisplayConfig) -> Self {
        let width = saturating_i32(config.screen_width);
        let height = saturating_i32(config.screen_height);
        let spacing = saturating_i32(config.dot_spacing);
        let dot_size = saturating_i32(config.dot_size);
        let offset = config.super_dot_offset as f32;

        // Saturating: an oversized block simply fits zero times
        let block_pixel_dimension = (saturating_i32(config.block_size) - 1)
            .saturating_mul(spacing)
            .saturating_add(LOGICAL_DOT_SIZE);
        let gap_pixel_size = saturating_i32(config.block_gap_dots).saturating_mul(spacing);
        let step = block_pixel_dimension.saturating_add(gap_pixel_size);

        let columns = blocks_along(width, block_pixel_dimension, gap_pixel_size);
        let rows = blocks_along(height, block_pixel_dimension, gap_pixel_size);

        let padding = Point::new(
            (width - grid_span(columns, block_pixel_dimension, gap_pixel_size)) / 2,
            (height - grid_span(rows, block_pixel_dimension, gap_pixel_size)) / 2,
        );

        // Center of the first logical dot, then offset to the block center
        let first_center = padding + Point::new(LOGICAL_DOT_SIZE / 2, LOGICAL_DOT_SIZE / 2);
        let center_offset = (block_pixel_dimension - LOGICAL_DOT_SIZE) as f32 / 2.0;

        let mut blocks = Vec::with_capacity((columns * rows) as usize);
        let mut dots = Vec::with_capacity(blocks.capacity() * DOTS_PER_BLOCK);

        for row in 0..rows as i32 {
            let center_y = (first_center.y + row * step) as f32 + center_offset;
            for col in 0..columns as i32 {
                let center_x = (first_center.x + col * step) as f32 + center_offset;

                let id = blocks.len();
                let mut block = Block::new(id, Point::new(center_x as i32, center_y as i32));

                for (sx, sy) in DOT_OFFSETS {
                    let dot_center_x = center_x + sx as f32 * offset;
                    let dot_center_y = center_y + sy as f32 * offset;
                    let top_left = Point::new(
                        (dot_center_x - (dot_size / 2) as f32) as i32,
                        (dot_center_y - (dot_size / 2) as f32) as i32,
                    );

                    if !fits(top_left, dot_size, width, height) {
                        continue;
                    }

                    let dot = Dot { top_left, block_id: id };
                    // Capacity equals DOT_OFFSETS.len(), push cannot fail
                    block.dots.push(dot).ok();
                    dots.push(dot);
                }

                blocks.push(block);
            }
        }

        log::debug!(
            "Layout: {columns}x{rows} blocks, {} dots, padding ({}, {})",
            dots.len(),
            padding.x,
            padding.y
        );

        Self {
            columns,
            rows,
            block_pixel_dimension,
            gap_pixel_size,
            padding,
            blocks,
            dots,
        }
    }
}

/// Maximum number of blocks of size `dim` separated by `gap` within `extent`.
fn blocks_along(extent: i32, dim: i32, gap: i32) -> u32 {
    if dim <= 0 || dim > extent {
        return 0;
    }
    let step = dim.saturating_add(gap).max(1);
    (1 + (extent - dim) / step) as u32
}

/// Pixel span of `n` blocks including the gaps between them.
fn grid_span(n: u32, dim: i32, gap: i32) -> i32 {
    if n == 0 {
        return 0;
    }
    let n = n as i32;
    n * dim + (n - 1) * gap
}

fn fits(top_left: Point, size: i32, width: i32, height: i32) -> bool {
    let (x, y, size) = (i64::from(top_left.x), i64::from(top_left.y), i64::from(size));
    x >= 0 && y >= 0 && x + size <= i64::from(width) && y + size <= i64::from(height)
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
