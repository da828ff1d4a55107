//! Error types for field processing.

use ocean_common::OceanError;
use thiserror::Error;

/// Errors that can occur while loading or reshaping a field.
#[derive(Error, Debug)]
pub enum FieldError {
    /// Index, shape or parameter problem in the dataset itself.
    #[error(transparent)]
    Ocean(#[from] OceanError),

    /// Failed to read an `.npz` archive.
    #[error("failed to read npz archive: {0}")]
    ReadNpz(#[from] ndarray_npy::ReadNpzError),

    /// Failed to write an `.npz` archive.
    #[error("failed to write npz archive: {0}")]
    WriteNpz(#[from] ndarray_npy::WriteNpzError),

    /// Failed to read an `.npy` file.
    #[error("failed to read npy file: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// Failed to write an `.npy` file.
    #[error("failed to write npy file: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// The archive does not hold the requested entry.
    #[error("entry '{name}' not found in archive (available: {available:?})")]
    MissingEntry { name: String, available: Vec<String> },

    /// Unsupported file extension.
    #[error("unsupported array file '{0}': expected .npz or .npy")]
    UnsupportedFormat(String),

    /// Array could not be assembled into the requested shape.
    #[error("array shape error: {0}")]
    Shape(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FieldError {
    /// Create a Shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}

impl From<ndarray::ShapeError> for FieldError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Shape(err.to_string())
    }
}

/// Result type for field processing operations.
pub type Result<T> = std::result::Result<T, FieldError>;
