//! Display configuration.
//!
//! Fixed values live in constants; everything a caller may tune is a typed
//! field of [`DisplayConfig`], whose [`Default`] reproduces the stock look of
//! the display (5×7 blocks of 2×2 super dots on a 240×320 screen).
//!
//! Configuration can be loaded from JSON. Every field is optional and falls
//! back to its default:
//!
//! ```json
//! {
//!     "dot_size": 10,
//!     "animation_interval_ms": 20,
//!     "update_percentage_high": 0.3,
//!     "update_percentage_low": 0.1,
//!     "id_color": "#00ff00",
//!     "shapes": { "corners": [0, 4, 30, 34] }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use serde::Deserialize;

use crate::colors::{self, BLACK, LIME};
use crate::error::ConfigError;
use crate::shapes::ShapeSet;

// =============================================================================
// Display Configuration
// =============================================================================

/// Default canvas width in pixels (portrait screen).
pub const SCREEN_WIDTH: u32 = 240;

/// Default canvas height in pixels.
pub const SCREEN_HEIGHT: u32 = 320;

/// Size of one logical dot in pixels. Only used to size blocks during layout;
/// the drawn dots use [`DisplayConfig::dot_size`].
pub const LOGICAL_DOT_SIZE: i32 = 4;

/// Upper bound for canvas and geometry parameters, so layout math stays
/// well inside `i32`.
pub const MAX_DIMENSION: u32 = 16_384;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Default minimum interval between two animation frames (~50 FPS).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// How often the frame driver reports progress.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Driver poll granularity; keeps the loop from spinning at 100% CPU.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// Brightness
// =============================================================================

/// Inclusive brightness range, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BrightnessRange {
    pub min: u8,
    pub max: u8,
}

impl BrightnessRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    #[inline]
    pub const fn contains(&self, level: u8) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Dim range for dots of non-highlighted blocks.
pub const LOW_BRIGHTNESS: BrightnessRange = BrightnessRange::new(0, 100);

/// Bright range for dots of highlighted blocks.
pub const HIGH_BRIGHTNESS: BrightnessRange = BrightnessRange::new(155, 255);

// =============================================================================
// DisplayConfig
// =============================================================================

/// Tunable parameters for layout, animation, and the id overlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Canvas width in pixels.
    pub screen_width: u32,
    /// Canvas height in pixels.
    pub screen_height: u32,

    /// Side length of a drawn (super) dot in pixels.
    pub dot_size: u32,
    /// Distance between the centers of two logical dots.
    pub dot_spacing: u32,
    /// Logical dots per block side.
    pub block_size: u32,
    /// Logical dot positions skipped between two blocks.
    pub block_gap_dots: u32,
    /// Offset from the block center to each of its 2×2 super dots.
    pub super_dot_offset: i32,

    /// Background color, also the initial color of every dot.
    #[serde(deserialize_with = "colors::deserialize")]
    pub bg_color: Rgb888,

    /// Minimum delay between two frames, in milliseconds.
    pub animation_interval_ms: u64,
    /// Fraction of highlighted dots redrawn per frame.
    pub update_percentage_high: f32,
    /// Fraction of non-highlighted dots redrawn per frame.
    pub update_percentage_low: f32,

    pub low_brightness: BrightnessRange,
    pub high_brightness: BrightnessRange,

    /// Draw each block's id at its center.
    pub show_ids: bool,
    #[serde(deserialize_with = "colors::deserialize")]
    pub id_color: Rgb888,
    pub id_font_size: u32,

    /// Named shapes. `"none"` is always present.
    pub shapes: ShapeSet,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            dot_size: 12,
            dot_spacing: 6,
            block_size: 6,
            block_gap_dots: 2,
            super_dot_offset: 8,
            bg_color: BLACK,
            animation_interval_ms: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            update_percentage_high: 0.25,
            update_percentage_low: 0.05,
            low_brightness: LOW_BRIGHTNESS,
            high_brightness: HIGH_BRIGHTNESS,
            show_ids: false,
            id_color: LIME,
            id_font_size: 10,
            shapes: ShapeSet::default(),
        }
    }
}

impl DisplayConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Minimum delay between two frames.
    #[inline]
    pub const fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    /// Check value ranges that layout and sampling rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("dot_size", self.dot_size),
            ("dot_spacing", self.dot_spacing),
            ("block_size", self.block_size),
            ("id_font_size", self.id_font_size),
        ];
        if let Some(&(field, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { field });
        }

        let bounded = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("dot_size", self.dot_size),
            ("dot_spacing", self.dot_spacing),
            ("block_size", self.block_size),
            ("block_gap_dots", self.block_gap_dots),
            ("super_dot_offset", self.super_dot_offset.unsigned_abs()),
            ("id_font_size", self.id_font_size),
        ];
        if let Some(&(field, value)) = bounded.iter().find(|(_, value)| *value > MAX_DIMENSION) {
            return Err(ConfigError::TooLarge {
                field,
                value,
                max: MAX_DIMENSION,
            });
        }

        for (field, value) in [
            ("update_percentage_high", self.update_percentage_high),
            ("update_percentage_low", self.update_percentage_low),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Percentage { field, value });
            }
        }

        for (field, range) in [
            ("low_brightness", self.low_brightness),
            ("high_brightness", self.high_brightness),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
