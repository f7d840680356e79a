//! Error types for the dot-matrix display.
//!
//! Errors fall into three classes:
//!
//! | Error | Severity | Handling |
//! |-------|----------|----------|
//! | [`ShapeError`] | Recoverable warning | Fallback to the empty highlight set |
//! | [`SurfaceError`] | Recoverable, per draw call | Logged, the dot or label is skipped |
//! | [`DisplayError::SurfaceUnavailable`] | Fatal to the session | Drawing becomes a no-op |
//!
//! [`ConfigError`] is raised before a display exists, while validating or
//! loading a [`DisplayConfig`](crate::config::DisplayConfig).

use thiserror::Error;

/// A single draw call on the rendering surface failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The backend rejected a rectangle draw.
    #[error("failed to draw rectangle at ({x},{y}): {reason}")]
    Rectangle { x: i32, y: i32, reason: String },

    /// The backend rejected a text draw.
    #[error("failed to draw text {text:?} at ({x},{y}): {reason}")]
    Text { x: i32, y: i32, text: String, reason: String },
}

/// Shape lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The requested name is not part of the configured shape set.
    #[error("shape '{0}' not found, using 'none'")]
    Unknown(String),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge { field: &'static str, value: u32, max: u32 },

    #[error("{field} must be within 0.0..=1.0, got {value}")]
    Percentage { field: &'static str, value: f32 },

    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange { field: &'static str, min: u8, max: u8 },

    #[error("unrecognized color '{0}' (expected a name or #RRGGBB)")]
    Color(String),

    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration file")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`DotMatrixDisplay`](crate::display::DotMatrixDisplay) operations.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// No rendering surface is attached; drawing is disabled.
    #[error("rendering surface is unavailable")]
    SurfaceUnavailable,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
