//! Error types for ocean data handling.

use thiserror::Error;

/// Result type alias using OceanError.
pub type OceanResult<T> = Result<T, OceanError>;

/// Primary error type for dataset access and validation.
#[derive(Debug, Error)]
pub enum OceanError {
    // === Indexing Errors ===
    #[error("chemical index not valid: {index} (field has {available} chemicals)")]
    InvalidChemical { index: usize, available: usize },

    #[error("unknown chemical name: {0}")]
    UnknownChemical(String),

    #[error("timestep not valid: {index} (field has {available} timesteps)")]
    InvalidTimestep { index: usize, available: usize },

    #[error("location ({lat}, {lon}) is outside the {n_lat}x{n_lon} grid")]
    InvalidLocation {
        lat: usize,
        lon: usize,
        n_lat: usize,
        n_lon: usize,
    },

    // === Data Errors ===
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("no usable data: {0}")]
    EmptyData(String),

    #[error("invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("failed to parse date '{value}' on line {line}")]
    DateParse { line: usize, value: String },

    // === Infrastructure Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OceanError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether the error comes from a caller-supplied index or parameter
    /// rather than from the data or the filesystem.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            OceanError::InvalidChemical { .. }
                | OceanError::UnknownChemical(_)
                | OceanError::InvalidTimestep { .. }
                | OceanError::InvalidLocation { .. }
                | OceanError::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_chemical_message() {
        let err = OceanError::InvalidChemical {
            index: 4,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "chemical index not valid: 4 (field has 4 chemicals)"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_io_is_not_user_error() {
        let err: OceanError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_user_error());
    }
}
