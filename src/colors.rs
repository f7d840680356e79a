//! Color helpers for the dot-matrix display.
//!
//! Dots are rendered as pure grays: a sampled brightness `g` becomes
//! `Rgb888::new(g, g, g)`, i.e. the `#gggggg` hex string with the same two hex
//! digits repeated for every channel.
//!
//! Configuration accepts colors either by name (`"black"`, `"lime"`, ...) or as
//! `#RRGGBB` hex strings. Both parse to [`Rgb888`].

use core::fmt::Write;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use heapless::String;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

// =============================================================================
// Named Colors
// =============================================================================

/// Pure black. Default background and cleanup color.
pub const BLACK: Rgb888 = Rgb888::BLACK;

/// Pure white.
pub const WHITE: Rgb888 = Rgb888::WHITE;

/// Bright green (web "lime"). Default color of the block id overlay.
pub const LIME: Rgb888 = Rgb888::GREEN;

/// Web "green" (half-intensity).
pub const GREEN: Rgb888 = Rgb888::new(0, 128, 0);

/// Web "gray".
pub const GRAY: Rgb888 = Rgb888::new(128, 128, 128);

/// Names understood by [`parse_color`], with their values.
const NAMED_COLORS: [(&str, Rgb888); 12] = [
    ("black", BLACK),
    ("white", WHITE),
    ("lime", LIME),
    ("green", GREEN),
    ("red", Rgb888::RED),
    ("blue", Rgb888::BLUE),
    ("yellow", Rgb888::YELLOW),
    ("cyan", Rgb888::CYAN),
    ("magenta", Rgb888::MAGENTA),
    ("orange", Rgb888::new(255, 165, 0)),
    ("gray", GRAY),
    ("grey", GRAY),
];

// =============================================================================
// Gray Levels
// =============================================================================

/// Gray color with `level` replicated into all three channels.
#[inline]
pub const fn gray(level: u8) -> Rgb888 {
    Rgb888::new(level, level, level)
}

/// Format a color as `#RRGGBB` (lowercase hex digits).
pub fn to_hex(color: Rgb888) -> String<7> {
    let mut s = String::new();
    // 7 bytes always fit
    write!(s, "#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b()).ok();
    s
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a named color or a `#RRGGBB` hex string (case-insensitive).
pub fn parse_color(input: &str) -> Result<Rgb888, ConfigError> {
    let trimmed = input.trim();

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ConfigError::Color(input.to_owned()));
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, color)| *color)
        .ok_or_else(|| ConfigError::Color(input.to_owned()))
}

fn parse_hex(hex: &str) -> Option<Rgb888> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: core::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgb888::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Serde adapter: deserialize a color from its name or hex string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Rgb888, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = <std::string::String as Deserialize>::deserialize(deserializer)?;
    parse_color(&raw).map_err(serde::de::Error::custom)
}

// =============================================================================
// Unit Tests
// =============================================================================
