//! Error types for the analysis crate.

use cluster_engine::ClusterError;
use field_processor::FieldError;
use ocean_common::OceanError;
use thiserror::Error;

/// Errors that can occur during an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("No complete samples to cluster: {0}")]
    NoSamples(String),
}

impl From<OceanError> for AnalysisError {
    fn from(e: OceanError) -> Self {
        AnalysisError::Field(FieldError::from(e))
    }
}

impl AnalysisError {
    /// True for errors caused by the caller's arguments rather than the data.
    pub fn is_user_error(&self) -> bool {
        match self {
            AnalysisError::Field(FieldError::Ocean(e)) => e.is_user_error(),
            AnalysisError::Cluster(
                ClusterError::InvalidParameter { .. } | ClusterError::TooManyClusters { .. },
            ) => true,
            _ => false,
        }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
