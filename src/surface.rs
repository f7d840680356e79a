//! Rendering surface abstraction.
//!
//! The display core only needs two drawing capabilities: fill a rectangle and
//! draw a short text label. [`RenderingSurface`] captures exactly that, so the
//! core can drive a real panel, the desktop simulator, or a test recorder.
//!
//! [`GraphicsSurface`] adapts any embedded-graphics [`DrawTarget`] with
//! [`Rgb888`] pixels (e.g. `SimulatorDisplay<Rgb888>`).

use core::fmt::Debug;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
    text::Text,
};

use crate::error::SurfaceError;
use crate::styles::{CENTERED, TOP_LEFT, font_for_size};

/// Anchor of a text draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// The anchor is the center of the text.
    Center,
    /// The anchor is the top-left corner of the text.
    TopLeft,
}

/// Drawing capability consumed by the display core.
pub trait RenderingSurface {
    /// Fill a `width`×`height` rectangle at `top_left`, outlined in `outline`.
    fn draw_rectangle(
        &mut self,
        top_left: Point,
        size: Size,
        fill: Rgb888,
        outline: Rgb888,
    ) -> Result<(), SurfaceError>;

    /// Draw `text` at `position` using a font of roughly `font_size` pixels.
    fn draw_text(
        &mut self,
        position: Point,
        text: &str,
        font_size: u32,
        color: Rgb888,
        origin: TextOrigin,
    ) -> Result<(), SurfaceError>;
}

// =============================================================================
// embedded-graphics Adapter
// =============================================================================

/// [`RenderingSurface`] over an embedded-graphics draw target.
pub struct GraphicsSurface<D> {
    target: D,
}

impl<D> GraphicsSurface<D> {
    pub const fn new(target: D) -> Self {
        Self { target }
    }

    /// The wrapped draw target (e.g. to flush it to a window).
    #[inline]
    pub const fn target(&self) -> &D {
        &self.target
    }
}

impl<D> RenderingSurface for GraphicsSurface<D>
where
    D: DrawTarget<Color = Rgb888>,
    D::Error: Debug,
{
    fn draw_rectangle(
        &mut self,
        top_left: Point,
        size: Size,
        fill: Rgb888,
        outline: Rgb888,
    ) -> Result<(), SurfaceError> {
        let style = PrimitiveStyleBuilder::new()
            .fill_color(fill)
            .stroke_color(outline)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();

        Rectangle::new(top_left, size)
            .into_styled(style)
            .draw(&mut self.target)
            .map_err(|e| SurfaceError::Rectangle {
                x: top_left.x,
                y: top_left.y,
                reason: format!("{e:?}"),
            })
    }

    fn draw_text(
        &mut self,
        position: Point,
        text: &str,
        font_size: u32,
        color: Rgb888,
        origin: TextOrigin,
    ) -> Result<(), SurfaceError> {
        let character_style = MonoTextStyle::new(font_for_size(font_size), color);
        let text_style = match origin {
            TextOrigin::Center => CENTERED,
            TextOrigin::TopLeft => TOP_LEFT,
        };

        Text::with_text_style(text, position, character_style, text_style)
            .draw(&mut self.target)
            .map(|_| ())
            .map_err(|e| SurfaceError::Text {
                x: position.x,
                y: position.y,
                text: text.to_owned(),
                reason: format!("{e:?}"),
            })
    }
}

// =============================================================================
// Test Recorder
// =============================================================================


// =============================================================================
// Unit Tests
// =============================================================================
