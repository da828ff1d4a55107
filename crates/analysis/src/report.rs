//! Clustering results in grid or time layout.

use cluster_engine::{silhouette_score, ClusterMode, ClusterOutcome, Dendrogram};
use field_processor::{cluster_sizes, rank_labels, sort_clusters, FeatureMatrix};
use ndarray::{Array, Array1, Array2, Dimension, Ix1, Ix2};
use serde::Serialize;
use tracing::info;

/// Outcome of one analysis plus its labels laid out for plotting.
#[derive(Debug, Clone)]
pub struct ClusteringReport<D: Dimension> {
    pub outcome: ClusterOutcome,

    /// Labels as floats, NaN where no label applies.
    pub labels: Array<f64, D>,

    /// `cluster_sizes[i]` counts samples labelled `i`.
    pub cluster_sizes: Vec<usize>,

    /// Mean silhouette over labelled samples.
    pub silhouette: Option<f64>,
}

/// Labels on the lat × lon grid.
pub type SpatialReport = ClusteringReport<Ix2>;

/// Labels along the time axis.
pub type TemporalReport = ClusteringReport<Ix1>;

impl<D: Dimension> ClusteringReport<D> {
    pub(crate) fn new(
        outcome: ClusterOutcome,
        labels: Array<f64, D>,
        features: &FeatureMatrix,
        verbose: bool,
    ) -> Self {
        let (cluster_sizes, silhouette) = match outcome.n_clusters {
            Some(n) => (
                cluster_sizes(&outcome.labels, n),
                silhouette_score(features.records.view(), &outcome.labels),
            ),
            None => (Vec::new(), None),
        };
        if verbose {
            info!(sizes = ?cluster_sizes, silhouette = ?silhouette, "Cluster sizes");
        }
        Self {
            outcome,
            labels,
            cluster_sizes,
            silhouette,
        }
    }

    pub fn n_clusters(&self) -> Option<usize> {
        self.outcome.n_clusters
    }

    /// The same report with cluster ids ranked by size, smallest first.
    ///
    /// Both the laid-out labels and the per-sample labels of the outcome
    /// are renumbered.
    pub fn sorted_by_size(&self) -> Self {
        let mut sizes = self.cluster_sizes.clone();
        sizes.sort_unstable();
        let outcome = ClusterOutcome {
            labels: rank_labels(&self.outcome.labels, &self.cluster_sizes),
            ..self.outcome.clone()
        };
        Self {
            outcome,
            labels: sort_clusters(&self.labels, &self.cluster_sizes),
            cluster_sizes: sizes,
            silhouette: self.silhouette,
        }
    }

    /// Serializable digest for writing next to the label array.
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            mode: self.outcome.mode,
            n_samples: self.outcome.labels.len(),
            n_clusters: self.outcome.n_clusters,
            cluster_sizes: &self.cluster_sizes,
            noise: self.outcome.noise_count(),
            silhouette: self.silhouette,
            inertia: self.outcome.inertia,
            dendrogram: self.outcome.dendrogram.as_ref(),
        }
    }
}

impl SpatialReport {
    pub(crate) fn empty_grid(shape: (usize, usize)) -> Array2<f64> {
        Array2::from_elem(shape, f64::NAN)
    }
}

impl TemporalReport {
    pub(crate) fn empty_series() -> Array1<f64> {
        Array1::from_elem(0, f64::NAN)
    }
}

/// JSON view of a [`ClusteringReport`].
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub mode: ClusterMode,
    pub n_samples: usize,
    pub n_clusters: Option<usize>,
    pub cluster_sizes: &'a [usize],
    pub noise: usize,
    pub silhouette: Option<f64>,
    pub inertia: Option<f64>,
    pub dendrogram: Option<&'a Dendrogram>,
}
