//! Error types for rendering.

use ocean_common::OceanError;
use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering or encoding images.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Nothing to draw: {0}")]
    Empty(String),

    #[error("Invalid palette: {0}")]
    Palette(String),

    #[error(transparent)]
    Ocean(#[from] OceanError),

    #[error("Failed to parse style JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
