//! Text styles for the block id overlay.
//!
//! Alignment styles are `const`, so nothing is built per frame. Fonts are
//! picked by requested pixel size: the largest available mono font whose
//! height does not exceed the request, falling back to the smallest.
//!
//! | Requested size | Font |
//! |----------------|------|
//! | < 12 | `FONT_6X10` |
//! | 12..=13 | `ProFont` 12pt |
//! | 14..=17 | `ProFont` 14pt |
//! | 18..=23 | `ProFont` 18pt |
//! | >= 24 | `ProFont` 24pt |

use embedded_graphics::{
    mono_font::{MonoFont, ascii::FONT_6X10},
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

// =============================================================================
// Text Alignment Styles (const - zero runtime cost)
// =============================================================================

/// Text centered horizontally and vertically on the anchor point.
pub const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Text whose top-left corner sits on the anchor point.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

// =============================================================================
// Font Selection
// =============================================================================

/// Fonts ordered by height, paired with the smallest size that selects them.
const FONTS_BY_SIZE: [(u32, &MonoFont); 5] = [
    (0, &FONT_6X10),
    (12, &PROFONT_12_POINT),
    (14, &PROFONT_14_POINT),
    (18, &PROFONT_18_POINT),
    (24, &PROFONT_24_POINT),
];

/// Mono font for a requested text size in pixels.
pub fn font_for_size(size: u32) -> &'static MonoFont<'static> {
    FONTS_BY_SIZE
        .iter()
        .rev()
        .find(|(min, _)| size >= *min)
        .map_or(&FONT_6X10, |(_, font)| *font)
}
