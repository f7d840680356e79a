//! The dot-matrix display: layout, shape state and animation behind one type.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► initialize ──► set_target_shape / update_frame ... ──► cleanup
//!              ▲                                                  │
//!              └──────────── attach_surface (retry) ◄─────────────┘
//! ```
//!
//! # Block State Machine
//!
//! | Transition | Trigger | Immediate redraw |
//! |------------|---------|------------------|
//! | LOW → HIGH | block joins the active shape | none, fades in over frames |
//! | HIGH → LOW | block leaves the active shape | all dots, low brightness |
//!
//! # Missing Surface
//!
//! Without a surface every drawing operation is a no-op, while layout and
//! shape selection keep working, so callers can inspect state and retry with
//! [`DotMatrixDisplay::attach_surface`].

use core::fmt::Write;

use embedded_graphics::prelude::{Point, Size};

use crate::animations::{FlickerAnimator, FrameReport, dot_rect};
use crate::colors::BLACK;
use crate::config::DisplayConfig;
use crate::error::{DisplayError, ShapeError};
use crate::layout::{Block, Dot, Layout};
use crate::metrics::FrameMetrics;
use crate::registry::BlockRegistry;
use crate::shapes::NONE;
use crate::surface::{RenderingSurface, TextOrigin};

/// Enough digits for any block id.
type IdLabel = heapless::String<20>;

/// Animated dot-matrix shape display drawing onto a [`RenderingSurface`].
pub struct DotMatrixDisplay<S> {
    config: DisplayConfig,
    surface: Option<S>,
    registry: BlockRegistry,
    animator: FlickerAnimator,
    selected_shape: String,
    metrics: FrameMetrics,
}

impl<S: RenderingSurface> DotMatrixDisplay<S> {
    /// Validate `config`, compute the layout, and take ownership of `surface`.
    ///
    /// Pass `None` when the surface could not be created; the display then
    /// reports [`DisplayError::SurfaceUnavailable`] from [`initialize`](Self::initialize).
    pub fn new(config: DisplayConfig, surface: Option<S>) -> Result<Self, DisplayError> {
        Self::with_animator(config, surface, FlickerAnimator::from_entropy())
    }

    /// Like [`new`](Self::new) with a deterministic flicker sequence.
    pub fn with_seed(config: DisplayConfig, surface: Option<S>, seed: u64) -> Result<Self, DisplayError> {
        Self::with_animator(config, surface, FlickerAnimator::with_seed(seed))
    }

    fn with_animator(
        config: DisplayConfig,
        surface: Option<S>,
        animator: FlickerAnimator,
    ) -> Result<Self, DisplayError> {
        config.validate()?;
        let registry = BlockRegistry::from_layout(Layout::compute(&config));

        log::info!(
            "Dot matrix ready: {} blocks, {} dots on {}x{}",
            registry.blocks().len(),
            registry.dots().len(),
            config.screen_width,
            config.screen_height
        );
        if surface.is_none() {
            log::warn!("No rendering surface, drawing disabled");
        }

        Ok(Self {
            config,
            surface,
            registry,
            animator,
            selected_shape: NONE.to_owned(),
            metrics: FrameMetrics::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub const fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Whether drawing is possible.
    #[inline]
    pub const fn is_surface_available(&self) -> bool {
        self.surface.is_some()
    }

    #[inline]
    pub const fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    #[inline]
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Attach a (new) surface, e.g. after a failed start. Call
    /// [`initialize`](Self::initialize) afterwards.
    pub fn attach_surface(&mut self, surface: S) {
        log::info!("Rendering surface attached");
        self.surface = Some(surface);
    }

    /// Name of the active shape as last requested, even if it was unknown.
    #[inline]
    pub fn selected_shape(&self) -> &str {
        &self.selected_shape
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        self.registry.blocks()
    }

    #[inline]
    pub fn dots(&self) -> &[Dot] {
        self.registry.dots()
    }

    #[inline]
    pub const fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// `(highlighted, non-highlighted)` dot counts.
    #[inline]
    pub fn dot_counts(&self) -> (usize, usize) {
        (self.registry.high_dot_count(), self.registry.low_dot_count())
    }

    #[inline]
    pub const fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    #[inline]
    pub fn metrics_mut(&mut self) -> &mut FrameMetrics {
        &mut self.metrics
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Clear the canvas, draw every dot in the background color, then the
    /// id overlay if enabled.
    pub fn initialize(&mut self) -> Result<(), DisplayError> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(DisplayError::SurfaceUnavailable);
        };

        let bg = self.config.bg_color;
        let canvas = Size::new(self.config.screen_width, self.config.screen_height);
        if let Err(e) = surface.draw_rectangle(Point::zero(), canvas, bg, bg) {
            log::error!("Error clearing screen: {e}");
            self.metrics.add_draw_failures(1);
        }

        for dot in self.registry.dots() {
            let (top_left, size) = dot_rect(dot, self.config.dot_size);
            if let Err(e) = surface.draw_rectangle(top_left, size, bg, bg) {
                log::error!("Error drawing background dot: {e}");
                self.metrics.add_draw_failures(1);
            }
        }

        self.draw_ids();
        Ok(())
    }

    /// Make `name` the active shape.
    ///
    /// Blocks leaving the shape are redrawn dim at once. The name is recorded
    /// even when unknown; in that case nothing is highlighted and
    /// [`ShapeError::Unknown`] is returned as a warning, the display stays usable.
    pub fn set_target_shape(&mut self, name: &str) -> Result<(), ShapeError> {
        name.clone_into(&mut self.selected_shape);

        let (target, outcome) = match self.config.shapes.resolve(name) {
            Ok(ids) => (ids, Ok(())),
            Err(e) => {
                log::warn!("{e}");
                (self.config.shapes.none(), Err(e))
            }
        };

        let dimmed = self.registry.apply_highlights(target);
        log::debug!(
            "Shape '{name}': {} dots highlighted, {} blocks dimmed",
            self.registry.high_dot_count(),
            dimmed.len()
        );

        if let Some(surface) = self.surface.as_mut() {
            for id in dimmed {
                let Some(block) = self.registry.block(id) else {
                    continue;
                };
                let failures = self.animator.redraw_block_low(block, surface, &self.config);
                self.metrics.record_forced_redraw(failures);
            }
        }

        outcome
    }

    /// Advance the flicker animation by one frame.
    ///
    /// Returns an empty report when there is no surface or no dot.
    pub fn update_frame(&mut self) -> FrameReport {
        let Some(surface) = self.surface.as_mut() else {
            return FrameReport::default();
        };
        if self.registry.dots().is_empty() {
            return FrameReport::default();
        }

        let report = self.animator.update_frame(&mut self.registry, surface, &self.config);
        self.metrics.record_report(&report);
        self.draw_ids();
        report
    }

    /// Toggle the id overlay. Turning it off repaints the canvas to erase labels.
    ///
    /// Without a surface only the setting changes; it takes effect on the
    /// next [`initialize`](Self::initialize).
    pub fn set_show_ids(&mut self, show: bool) -> Result<(), DisplayError> {
        if self.config.show_ids == show {
            return Ok(());
        }
        self.config.show_ids = show;
        if self.surface.is_none() {
            return Ok(());
        }
        self.initialize()
    }

    /// Fill the whole canvas black. Failures are logged, never fatal.
    pub fn cleanup(&mut self) {
        log::info!("Cleaning up...");
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let canvas = Size::new(self.config.screen_width, self.config.screen_height);
        match surface.draw_rectangle(Point::zero(), canvas, BLACK, BLACK) {
            Ok(()) => log::info!("Screen cleared"),
            Err(e) => {
                log::error!("Error clearing screen during cleanup: {e}");
                self.metrics.add_draw_failures(1);
            }
        }
    }

    /// Draw every block id at its center, if the overlay is enabled.
    fn draw_ids(&mut self) {
        if !self.config.show_ids {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let font_size = self.config.id_font_size;
        let color = self.config.id_color;

        for block in self.registry.blocks() {
            let mut label = IdLabel::new();
            write!(label, "{}", block.id()).ok();

            let center = block.center();
            if surface
                .draw_text(center, &label, font_size, color, TextOrigin::Center)
                .is_ok()
            {
                continue;
            }

            // Centered drawing unsupported: place the top-left corner by hand
            let fallback = center - label_offset(font_size, label.len());
            if let Err(e) = surface.draw_text(fallback, &label, font_size, color, TextOrigin::TopLeft) {
                log::error!("Error drawing text ID {} (fallback failed): {e}", block.id());
                self.metrics.add_draw_failures(1);
            }
        }
    }
}

/// Approximate half-extent of a label, used to center it from its top-left.
fn label_offset(font_size: u32, digits: usize) -> Point {
    let size = font_size as f32;
    Point::new((size * 0.3 * digits as f32) as i32, (size * 0.5) as i32)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
    use embedded_graphics_simulator::SimulatorDisplay;

    use super::*;
    use crate::colors::LIME;
    use crate::shapes::BlockIds;
    use crate::surface::GraphicsSurface;
    use crate::surface::recording::{DrawCall, RecordingSurface};

    const CROSS: [usize; 7] = [7, 12, 16, 17, 18, 22, 27];

    fn display() -> DotMatrixDisplay<RecordingSurface> {
        DotMatrixDisplay::with_seed(DisplayConfig::default(), Some(RecordingSurface::default()), 42).unwrap()
    }

    fn highlighted(display: &DotMatrixDisplay<RecordingSurface>) -> BlockIds {
        display.blocks().iter().filter(|b| b.is_highlighted()).map(Block::id).collect()
    }

    fn recorder(display: &mut DotMatrixDisplay<RecordingSurface>) -> &mut RecordingSurface {
        display.surface_mut().unwrap()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_starts_with_none() {
        let d = display();
        assert_eq!(d.selected_shape(), "none");
        assert!(highlighted(&d).is_empty());
        assert_eq!(d.blocks().len(), 35);
        assert_eq!(d.dot_counts(), (0, 140));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = DisplayConfig {
            dot_size: 0,
            ..DisplayConfig::default()
        };
        let result = DotMatrixDisplay::<RecordingSurface>::new(config, None);
        assert!(matches!(result, Err(DisplayError::Config(_))));
    }

    // -------------------------------------------------------------------------
    // Initialization
    // -------------------------------------------------------------------------

    #[test]
    fn test_initialize_clears_then_draws_background_dots() {
        let mut d = display();
        d.initialize().unwrap();

        let rects: Vec<(Point, Rgb888)> = recorder(&mut d).rects().collect();
        assert_eq!(rects.len(), 1 + 140, "One full clear plus every dot");
        assert_eq!(rects[0].0, Point::zero(), "First call clears the canvas");
        assert!(rects.iter().all(|(_, c)| *c == BLACK), "Everything starts in the background color");
        assert_eq!(recorder(&mut d).texts().count(), 0, "Ids are off by default");
    }

    #[test]
    fn test_initialize_full_canvas_size() {
        let mut d = display();
        d.initialize().unwrap();
        let first = recorder(&mut d).calls[0].clone();
        assert!(matches!(
            first,
            DrawCall::Rect { size, .. } if size == Size::new(240, 320)
        ));
    }

    #[test]
    fn test_initialize_draws_ids_when_enabled() {
        let config = DisplayConfig {
            show_ids: true,
            ..DisplayConfig::default()
        };
        let mut d = DotMatrixDisplay::with_seed(config, Some(RecordingSurface::default()), 1).unwrap();
        d.initialize().unwrap();

        let texts: Vec<(Point, String)> =
            recorder(&mut d).texts().map(|(p, t, _)| (p, t.to_owned())).collect();
        assert_eq!(texts.len(), 35);
        assert_eq!(texts[0], (Point::new(28, 22), "0".to_owned()), "Label at block center");
        assert_eq!(texts[34].1, "34");
    }

    // -------------------------------------------------------------------------
    // Shape Selection
    // -------------------------------------------------------------------------

    #[test]
    fn test_known_shape_highlights_exact_set() {
        let mut d = display();
        d.set_target_shape("cross").unwrap();

        assert_eq!(highlighted(&d), CROSS.into_iter().collect());
        assert_eq!(d.selected_shape(), "cross");
        assert_eq!(d.dot_counts(), (28, 112));
    }

    #[test]
    fn test_none_clears_all_highlights() {
        let mut d = display();
        d.set_target_shape("circle").unwrap();
        d.set_target_shape("none").unwrap();

        assert!(highlighted(&d).is_empty());
        assert!(d.blocks().iter().all(|b| !b.is_highlighted()));
    }

    #[test]
    fn test_unknown_shape_falls_back_to_none() {
        let mut d = display();
        d.set_target_shape("cross").unwrap();

        let result = d.set_target_shape("pentagram");

        assert_eq!(result, Err(ShapeError::Unknown("pentagram".to_owned())));
        assert!(highlighted(&d).is_empty(), "Fallback highlights nothing");
        assert_eq!(d.selected_shape(), "pentagram", "Requested name is still recorded");
    }

    #[test]
    fn test_deselected_blocks_forced_low() {
        let mut d = display();
        d.set_target_shape("cross").unwrap();
        assert!(recorder(&mut d).calls.is_empty(), "LOW -> HIGH forces no redraw");

        d.set_target_shape("none").unwrap();

        let rects: Vec<(Point, Rgb888)> = recorder(&mut d).rects().collect();
        assert_eq!(rects.len(), 7 * 4, "Every dot of every deselected block redrawn");
        for (_, c) in &rects {
            assert!(d.config().low_brightness.contains(c.r()), "Forced redraw must be dim");
        }
        let cross_dots: Vec<Point> = d
            .dots()
            .iter()
            .filter(|dot| CROSS.contains(&dot.block_id))
            .map(|dot| dot.top_left)
            .collect();
        let drawn: Vec<Point> = rects.iter().map(|(p, _)| *p).collect();
        assert_eq!(drawn, cross_dots, "Blocks redrawn in id order, dots in block order");
        assert_eq!(d.metrics().forced_block_redraws, 7);
    }

    #[test]
    fn test_partial_overlap_redraws_only_leaving_blocks() {
        let mut d = display();
        d.set_target_shape("filled_square").unwrap();
        d.set_target_shape("hollow_square").unwrap();

        // filled_square minus hollow_square is the center block 17
        let rects: Vec<Point> = recorder(&mut d).rects().map(|(p, _)| p).collect();
        let block17: Vec<Point> = d.blocks()[17].dots().iter().map(|dot| dot.top_left).collect();
        assert_eq!(rects, block17);
    }

    #[test]
    fn test_same_shape_twice_no_extra_redraws() {
        let mut d = display();
        d.set_target_shape("cross").unwrap();
        d.set_target_shape("none").unwrap();
        let after_first = d.metrics().forced_block_redraws;
        let calls_after_first = recorder(&mut d).calls.len();

        d.set_target_shape("none").unwrap();

        assert_eq!(d.metrics().forced_block_redraws, after_first);
        assert_eq!(recorder(&mut d).calls.len(), calls_after_first);
    }

    // -------------------------------------------------------------------------
    // Frame Updates
    // -------------------------------------------------------------------------

    #[test]
    fn test_update_frame_counts() {
        let mut d = display();
        d.set_target_shape("cross").unwrap();

        let report = d.update_frame();

        assert_eq!(report.high_sampled, 7);
        assert_eq!(report.low_sampled, 5);
        assert_eq!(recorder(&mut d).rects().count(), 12);
        assert_eq!(d.metrics().total_frames, 1);
    }

    #[test]
    fn test_update_frame_redraws_ids_after_dots() {
        let config = DisplayConfig {
            show_ids: true,
            ..DisplayConfig::default()
        };
        let mut d = DotMatrixDisplay::with_seed(config, Some(RecordingSurface::default()), 3).unwrap();
        d.update_frame();

        let calls = &recorder(&mut d).calls;
        let first_text = calls.iter().position(|c| matches!(c, DrawCall::Text { .. })).unwrap();
        assert!(
            calls[first_text..].iter().all(|c| matches!(c, DrawCall::Text { .. })),
            "Labels are drawn on top of the dots"
        );
        assert_eq!(calls.len() - first_text, 35);
    }

    #[test]
    fn test_id_fallback_draw() {
        let config = DisplayConfig {
            show_ids: true,
            ..DisplayConfig::default()
        };
        let surface = RecordingSurface {
            fail_text_origin: Some(TextOrigin::Center),
            ..RecordingSurface::default()
        };
        let mut d = DotMatrixDisplay::with_seed(config, Some(surface), 4).unwrap();
        d.initialize().unwrap();

        let texts: Vec<(Point, TextOrigin)> = recorder(&mut d).texts().map(|(p, _, o)| (p, o)).collect();
        assert_eq!(texts.len(), 35, "Every label falls back to the manual offset");
        assert!(texts.iter().all(|(_, o)| *o == TextOrigin::TopLeft));
        // Block 0 center (28, 22), font 10, one digit: offset (3, 5)
        assert_eq!(texts[0].0, Point::new(25, 17));
        // Block 10, two digits: offset (6, 5)
        let center10 = d.blocks()[10].center();
        assert_eq!(texts[10].0, center10 - Point::new(6, 5));
        assert_eq!(d.metrics().draw_failures, 0, "Fallback succeeded");
    }

    #[test]
    fn test_id_fallback_failure_is_silent() {
        let config = DisplayConfig {
            show_ids: true,
            ..DisplayConfig::default()
        };
        let surface = RecordingSurface {
            fail_all_text: true,
            ..RecordingSurface::default()
        };
        let mut d = DotMatrixDisplay::with_seed(config, Some(surface), 5).unwrap();

        d.initialize().unwrap();
        let report = d.update_frame();

        assert_eq!(report.drawn(), 7, "Dots still animate");
        assert_eq!(d.metrics().draw_failures, 70, "Both label draws failed for 35 blocks, twice");
    }

    #[test]
    fn test_set_show_ids_toggle() {
        let mut d = display();
        d.set_show_ids(true).unwrap();
        assert_eq!(recorder(&mut d).texts().count(), 35);

        recorder(&mut d).clear();
        d.set_show_ids(true).unwrap();
        assert!(recorder(&mut d).calls.is_empty(), "Unchanged setting draws nothing");

        d.set_show_ids(false).unwrap();
        assert_eq!(recorder(&mut d).texts().count(), 0);
        assert_eq!(recorder(&mut d).rects().count(), 141, "Canvas repainted to erase labels");
    }

    // -------------------------------------------------------------------------
    // Missing Surface
    // -------------------------------------------------------------------------

    #[test]
    fn test_without_surface_data_model_still_works() {
        let mut d =
            DotMatrixDisplay::<RecordingSurface>::with_seed(DisplayConfig::default(), None, 6).unwrap();

        assert!(!d.is_surface_available());
        assert!(matches!(d.initialize(), Err(DisplayError::SurfaceUnavailable)));

        d.set_target_shape("cross").unwrap();
        assert_eq!(d.dot_counts(), (28, 112), "Shape selection still updates state");
        d.set_target_shape("none").unwrap();
        assert_eq!(d.metrics().forced_block_redraws, 0, "Nothing drawn without a surface");

        assert_eq!(d.update_frame(), FrameReport::default());
        d.cleanup();
    }

    #[test]
    fn test_set_show_ids_without_surface_is_deferred() {
        let mut d =
            DotMatrixDisplay::<RecordingSurface>::with_seed(DisplayConfig::default(), None, 12).unwrap();

        d.set_show_ids(true).unwrap();
        assert!(d.config().show_ids, "Setting is kept for later");

        d.attach_surface(RecordingSurface::default());
        d.initialize().unwrap();
        assert_eq!(recorder(&mut d).texts().count(), 35, "Ids appear once a surface exists");
    }

    #[test]
    fn test_attach_surface_retry() {
        let mut d =
            DotMatrixDisplay::<RecordingSurface>::with_seed(DisplayConfig::default(), None, 7).unwrap();
        assert!(d.initialize().is_err());

        d.attach_surface(RecordingSurface::default());

        assert!(d.is_surface_available());
        d.initialize().unwrap();
        assert_eq!(recorder(&mut d).rects().count(), 141);
    }

    // -------------------------------------------------------------------------
    // Cleanup
    // -------------------------------------------------------------------------

    #[test]
    fn test_cleanup_fills_black() {
        let config = DisplayConfig {
            bg_color: LIME,
            ..DisplayConfig::default()
        };
        let mut d = DotMatrixDisplay::with_seed(config, Some(RecordingSurface::default()), 8).unwrap();
        d.cleanup();

        let rects: Vec<(Point, Rgb888)> = recorder(&mut d).rects().collect();
        assert_eq!(rects, vec![(Point::zero(), BLACK)]);
    }

    #[test]
    fn test_cleanup_failure_is_not_fatal() {
        let surface = RecordingSurface {
            fail_rects: true,
            ..RecordingSurface::default()
        };
        let mut d = DotMatrixDisplay::with_seed(DisplayConfig::default(), Some(surface), 9).unwrap();
        d.cleanup();
        assert_eq!(d.metrics().draw_failures, 1);
    }

    // -------------------------------------------------------------------------
    // Pixel-level (in-memory simulator display)
    // -------------------------------------------------------------------------

    #[test]
    fn test_pixels_after_frames_on_simulator_display() {
        let target = SimulatorDisplay::<Rgb888>::new(Size::new(240, 320));
        let config = DisplayConfig {
            update_percentage_high: 1.0,
            ..DisplayConfig::default()
        };
        let mut d = DotMatrixDisplay::with_seed(config, Some(GraphicsSurface::new(target)), 10).unwrap();
        d.initialize().unwrap();
        d.set_target_shape("cross").unwrap();
        d.update_frame();

        let screen = d.surface().unwrap().target();
        let high = d.config().high_brightness;
        for dot in d.dots().iter().filter(|dot| CROSS.contains(&dot.block_id)) {
            let pixel = screen.get_pixel(dot.top_left + Point::new(6, 6));
            assert!(high.contains(pixel.r()), "Shape dot at {:?} should be bright", dot.top_left);
        }
        assert_eq!(screen.get_pixel(Point::new(0, 0)), BLACK, "Gaps stay background");
    }
}
