//! Flickering dot-matrix shape display.
//!
//! A fixed-resolution canvas is tiled with blocks of four dots. Named shapes
//! highlight sets of blocks; every frame a random sample of dots is redrawn
//! with a random gray, bright for highlighted blocks and dim for the rest,
//! giving a shimmering LED-matrix look.
//!
//! - [`config`]: Typed configuration with defaults, JSON loading and validation
//! - [`colors`]: Color constants, gray levels and color parsing
//! - [`shapes`]: Named block-id sets and shape lookup
//! - [`layout`]: Grid, block and dot geometry
//! - [`registry`]: Blocks, dots and brightness-class partitions
//! - [`animations`]: Per-frame flicker sampling
//! - [`surface`]: Rendering surface trait and embedded-graphics adapter
//! - [`styles`]: Fonts and text alignment for the id overlay
//! - [`display`]: The display tying it all together
//! - [`driver`]: Paced frame loop, cancellation and sharing
//! - [`metrics`]: Frame counters and timing
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```ignore
//! let surface = GraphicsSurface::new(SimulatorDisplay::<Rgb888>::new(Size::new(240, 320)));
//! let mut display = DotMatrixDisplay::new(DisplayConfig::default(), Some(surface))?;
//! display.initialize()?;
//! display.set_target_shape("circle")?;
//! loop {
//!     display.update_frame();
//! }
//! ```

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod animations;
pub mod colors;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod registry;
pub mod shapes;
pub mod styles;
pub mod surface;

// Re-export commonly used items
pub use config::DisplayConfig;
pub use display::DotMatrixDisplay;
pub use driver::{CancellationToken, FrameDriver, SharedDisplay};
pub use error::{ConfigError, DisplayError, ShapeError, SurfaceError};
pub use surface::{GraphicsSurface, RenderingSurface, TextOrigin};
