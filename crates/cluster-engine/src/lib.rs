//! Clustering backends for ocean feature matrices.
//!
//! [`cluster`] takes a samples × features matrix and dispatches on
//! [`ClusterMode`]:
//!
//! - **k-means** (`linfa-clustering`, k-means++ initialisation, best of
//!   `n_runs` restarts), reporting inertia
//! - **DBSCAN** (`linfa-clustering` over a `linfa-nn` k-d tree) with a
//!   Euclidean, Manhattan or Chebyshev metric; noise samples get no label
//! - **hierarchical** agglomerative clustering (`kodama`) with Ward, complete, average
//!   or single linkage, cut at `n_clusters` or at a distance threshold
//!
//! [`silhouette_score`] and [`elbow_sweep`] assess the result.

pub mod agglomerative;
mod dbscan;
pub mod elbow;
pub mod error;
mod kmeans;
pub mod params;
pub mod silhouette;

pub use agglomerative::{agglomerate, Dendrogram, Merge};
pub use elbow::{elbow_sweep, ElbowPoint};
pub use error::{ClusterError, Result};
pub use params::{ClusterMode, ClusterParams, DbscanMetric, Linkage};
pub use silhouette::silhouette_score;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Result of one clustering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterOutcome {
    pub mode: ClusterMode,

    /// One entry per sample; `None` marks DBSCAN noise.
    pub labels: Vec<Option<usize>>,

    /// Number of distinct labels. For DBSCAN this is the largest label plus
    /// one. `None` when a hierarchical tree was grown without a cut.
    pub n_clusters: Option<usize>,

    /// K-means inertia.
    pub inertia: Option<f64>,

    /// Merge tree of a hierarchical run.
    pub dendrogram: Option<Dendrogram>,
}

impl ClusterOutcome {
    /// Samples labelled as noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }
}

/// Reject inputs no backend can handle.
pub(crate) fn check_records(records: ArrayView2<'_, f64>) -> Result<()> {
    if records.nrows() == 0 || records.ncols() == 0 {
        return Err(ClusterError::EmptyInput);
    }
    if let Some(row) = records
        .outer_iter()
        .position(|r| r.iter().any(|v| !v.is_finite()))
    {
        return Err(ClusterError::NonFinite { row });
    }
    Ok(())
}

/// Cluster the rows of `records`.
pub fn cluster(records: ArrayView2<'_, f64>, params: &ClusterParams) -> Result<ClusterOutcome> {
    params.validate()?;
    check_records(records)?;
    let n_samples = records.nrows();
    if let Some(k) = params.n_clusters {
        if params.mode != ClusterMode::Dbscan && k > n_samples {
            return Err(ClusterError::TooManyClusters {
                requested: k,
                samples: n_samples,
            });
        }
    }

    info!(
        mode = %params.mode,
        samples = n_samples,
        features = records.ncols(),
        "Starting clustering"
    );
    let start = Instant::now();

    let outcome = match params.mode {
        ClusterMode::KMeans => {
            let k = params.n_clusters.unwrap_or(1);
            let fit = kmeans::fit_kmeans(records, k, params)?;
            ClusterOutcome {
                mode: params.mode,
                labels: fit.labels.into_iter().map(Some).collect(),
                n_clusters: Some(k),
                inertia: Some(fit.inertia),
                dendrogram: None,
            }
        }
        ClusterMode::Dbscan => {
            let labels = dbscan::fit_dbscan(records, params)?;
            let n_clusters = labels.iter().flatten().max().map(|m| m + 1).unwrap_or(0);
            ClusterOutcome {
                mode: params.mode,
                labels,
                n_clusters: Some(n_clusters),
                inertia: None,
                dendrogram: None,
            }
        }
        ClusterMode::Hierarchical => {
            let tree = agglomerate(records, params.linkage)?;
            let (labels, n_clusters) = match (params.n_clusters, params.distance_threshold) {
                (Some(k), _) => (tree.cut(k)?, Some(k)),
                (None, Some(threshold)) => {
                    let labels = tree.cut_at_distance(threshold);
                    let n = labels.iter().max().map(|m| m + 1).unwrap_or(0);
                    (labels, Some(n))
                }
                (None, None) => ((0..n_samples).collect(), None),
            };
            ClusterOutcome {
                mode: params.mode,
                labels: labels.into_iter().map(Some).collect(),
                n_clusters,
                inertia: None,
                dendrogram: Some(tree),
            }
        }
    };

    if params.verbose {
        info!(
            mode = %params.mode,
            clusters = ?outcome.n_clusters,
            noise = outcome.noise_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Finished clustering"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_input_rejected() {
        let records = ndarray::Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            cluster(records.view(), &ClusterParams::kmeans(2)),
            Err(ClusterError::EmptyInput)
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let records = array![[0.0, 1.0], [f64::NAN, 1.0]];
        assert!(matches!(
            cluster(records.view(), &ClusterParams::kmeans(1)),
            Err(ClusterError::NonFinite { row: 1 })
        ));
    }

    #[test]
    fn test_more_clusters_than_samples() {
        let records = array![[0.0], [1.0]];
        assert!(matches!(
            cluster(records.view(), &ClusterParams::kmeans(3)),
            Err(ClusterError::TooManyClusters { requested: 3, samples: 2 })
        ));
    }

    #[test]
    fn test_uncut_tree_gives_singletons() {
        let records = array![[0.0], [1.0], [5.0]];
        let params = ClusterParams::hierarchical(None, Linkage::Ward);
        let outcome = cluster(records.view(), &params).unwrap();
        assert_eq!(outcome.n_clusters, None);
        assert_eq!(outcome.labels, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(outcome.dendrogram.unwrap().merges().len(), 2);
    }
}
