//! Error types for clustering.

use thiserror::Error;

/// Result type for clustering operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors that can occur while clustering.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("No samples to cluster")]
    EmptyInput,

    #[error("Requested {requested} clusters but only {samples} samples")]
    TooManyClusters { requested: usize, samples: usize },

    #[error("Sample {row} contains a non-finite value")]
    NonFinite { row: usize },

    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("K-means failed: {0}")]
    KMeans(#[from] linfa_clustering::KMeansError),

    #[error("DBSCAN failed: {0}")]
    Dbscan(#[from] linfa_clustering::DbscanParamsError),
}

impl ClusterError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
