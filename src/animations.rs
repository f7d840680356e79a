//! Flicker animation engine.
//!
//! Every frame redraws only a random sample of the dots, not the whole grid.
//! Dots split into two brightness classes by their block's highlight flag:
//!
//! | Class | Brightness range | Sample fraction |
//! |-------|------------------|-----------------|
//! | High (highlighted block) | `high_brightness` | `update_percentage_high` |
//! | Low (other blocks) | `low_brightness` | `update_percentage_low` |
//!
//! Per class, `max(1, floor(len * fraction))` dots (capped at `len`) are drawn
//! without replacement, each with an independent uniform brightness. A dot
//! that is not sampled keeps whatever gray it had; there is no fade curve.
//!
//! # Sampling
//!
//! The registry keeps a persistent index list per class. Sampling runs a
//! partial Fisher-Yates shuffle over that list in place, so a frame allocates
//! nothing and touches only the sampled entries.
//!
//! # Shape Changes
//!
//! Blocks leaving the active shape are redrawn dim immediately through
//! [`FlickerAnimator::redraw_block_low`]; otherwise their bright dots would
//! linger until randomly resampled. Blocks joining the shape fade in through
//! regular frames.

use embedded_graphics::prelude::{Point, Size};
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::colors::{gray, to_hex};
use crate::config::{BrightnessRange, DisplayConfig};
use crate::error::SurfaceError;
use crate::layout::{Block, Dot};
use crate::registry::BlockRegistry;
use crate::surface::RenderingSurface;

/// Outcome of one animation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Dots sampled from the high class.
    pub high_sampled: usize,
    /// Dots sampled from the low class.
    pub low_sampled: usize,
    /// Draw calls that failed (dot skipped for this frame).
    pub failures: usize,
}

impl FrameReport {
    /// Dots actually redrawn this frame.
    #[inline]
    pub const fn drawn(&self) -> usize {
        self.high_sampled + self.low_sampled - self.failures
    }
}

/// Number of dots to redraw from a class of `len` dots.
///
/// `max(1, floor(len * fraction))`, capped at `len`. Empty classes yield 0.
pub fn sample_size(len: usize, fraction: f32) -> usize {
    if len == 0 {
        return 0;
    }
    let scaled = (len as f32 * fraction).floor() as usize;
    scaled.max(1).min(len)
}

/// Random source and per-frame logic of the flicker effect.
pub struct FlickerAnimator {
    rng: Xoshiro256PlusPlus,
}

impl FlickerAnimator {
    /// Deterministic animator; the same seed replays the same flicker.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Animator seeded from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::with_seed(rand::random())
    }

    /// Uniform brightness in `range` (inclusive).
    #[inline]
    pub fn brightness(&mut self, range: BrightnessRange) -> u8 {
        self.rng.gen_range(range.min..=range.max)
    }

    /// Redraw a random sample of each brightness class.
    pub fn update_frame<S: RenderingSurface>(
        &mut self,
        registry: &mut BlockRegistry,
        surface: &mut S,
        config: &DisplayConfig,
    ) -> FrameReport {
        let view = registry.sampling_view();
        let mut report = FrameReport::default();

        let (sampled, failures) = self.flicker_class(
            view.high,
            view.dots,
            surface,
            config,
            config.update_percentage_high,
            config.high_brightness,
        );
        report.high_sampled = sampled;
        report.failures += failures;

        let (sampled, failures) = self.flicker_class(
            view.low,
            view.dots,
            surface,
            config,
            config.update_percentage_low,
            config.low_brightness,
        );
        report.low_sampled = sampled;
        report.failures += failures;

        report
    }

    /// Redraw every dot of `block` with a low brightness.
    ///
    /// Returns the number of failed draws.
    pub fn redraw_block_low<S: RenderingSurface>(
        &mut self,
        block: &Block,
        surface: &mut S,
        config: &DisplayConfig,
    ) -> usize {
        let mut failures = 0;
        for dot in block.dots() {
            let level = self.brightness(config.low_brightness);
            if let Err(e) = draw_dot(surface, dot, config.dot_size, level) {
                log::error!("Error redrawing dot in block {}: {e}", block.id());
                failures += 1;
            }
        }
        failures
    }

    /// Sample and redraw one class. Returns `(sampled, failures)`.
    fn flicker_class<S: RenderingSurface>(
        &mut self,
        indices: &mut [usize],
        dots: &[Dot],
        surface: &mut S,
        config: &DisplayConfig,
        fraction: f32,
        range: BrightnessRange,
    ) -> (usize, usize) {
        let amount = sample_size(indices.len(), fraction);
        if amount == 0 {
            return (0, 0);
        }

        let (chosen, _) = indices.partial_shuffle(&mut self.rng, amount);
        let mut failures = 0;

        for &index in chosen.iter() {
            let Some(dot) = dots.get(index) else {
                continue;
            };
            let level = self.rng.gen_range(range.min..=range.max);
            if let Err(e) = draw_dot(surface, dot, config.dot_size, level) {
                log::error!(
                    "Error updating rect at ({},{}) to {}: {e}",
                    dot.top_left.x,
                    dot.top_left.y,
                    to_hex(gray(level))
                );
                failures += 1;
            }
        }

        (chosen.len(), failures)
    }
}

/// Draw `dot` as a solid gray square (fill and outline share the color).
pub fn draw_dot<S: RenderingSurface>(
    surface: &mut S,
    dot: &Dot,
    dot_size: u32,
    level: u8,
) -> Result<(), SurfaceError> {
    let color = gray(level);
    surface.draw_rectangle(dot.top_left, Size::new(dot_size, dot_size), color, color)
}

/// Square covering a dot, for callers that paint dots in a fixed color.
#[inline]
pub fn dot_rect(dot: &Dot, dot_size: u32) -> (Point, Size) {
    (dot.top_left, Size::new(dot_size, dot_size))
}

// =============================================================================
// Unit Tests
// =============================================================================
