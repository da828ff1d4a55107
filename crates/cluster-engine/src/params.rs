//! Clustering parameters.

use crate::{ClusterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clustering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMode {
    #[default]
    KMeans,
    Dbscan,
    Hierarchical,
}

impl ClusterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterMode::KMeans => "kmeans",
            ClusterMode::Dbscan => "dbscan",
            ClusterMode::Hierarchical => "hierarchical",
        }
    }
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterMode {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "kmeans" => Ok(ClusterMode::KMeans),
            "dbscan" => Ok(ClusterMode::Dbscan),
            "hierarchical" | "agglomerative" => Ok(ClusterMode::Hierarchical),
            _ => Err(ClusterError::invalid_parameter(
                "mode",
                format!("unknown mode '{}' (expected kmeans, dbscan or hierarchical)", s),
            )),
        }
    }
}

/// Distance used by DBSCAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbscanMetric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl fmt::Display for DbscanMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DbscanMetric::Euclidean => "euclidean",
            DbscanMetric::Manhattan => "manhattan",
            DbscanMetric::Chebyshev => "chebyshev",
        })
    }
}

impl FromStr for DbscanMetric {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DbscanMetric::Euclidean),
            "manhattan" | "cityblock" | "l1" => Ok(DbscanMetric::Manhattan),
            "chebyshev" | "linf" => Ok(DbscanMetric::Chebyshev),
            _ => Err(ClusterError::invalid_parameter(
                "metric",
                format!("unknown metric '{}'", s),
            )),
        }
    }
}

/// Inter-cluster distance for agglomerative clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Minimum increase of within-cluster variance.
    #[default]
    Ward,
    /// Maximum pairwise distance.
    Complete,
    /// Mean pairwise distance.
    Average,
    /// Minimum pairwise distance.
    Single,
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Linkage::Ward => "ward",
            Linkage::Complete => "complete",
            Linkage::Average => "average",
            Linkage::Single => "single",
        })
    }
}

impl FromStr for Linkage {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ward" => Ok(Linkage::Ward),
            "complete" | "maximum" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            "single" => Ok(Linkage::Single),
            _ => Err(ClusterError::invalid_parameter(
                "linkage",
                format!("unknown linkage '{}'", s),
            )),
        }
    }
}

/// Parameters for [`crate::cluster`].
///
/// Only the fields relevant to `mode` are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    pub mode: ClusterMode,

    /// k for k-means; cut size for hierarchical clustering.
    pub n_clusters: Option<usize>,

    /// DBSCAN neighbourhood radius.
    pub dbscan_eps: f64,

    /// DBSCAN core point threshold (the point itself included).
    pub dbscan_min_points: usize,

    pub metric: DbscanMetric,

    pub linkage: Linkage,

    /// Cut the hierarchical tree at this merge distance instead of at
    /// `n_clusters`.
    pub distance_threshold: Option<f64>,

    /// K-means iteration cap per run.
    pub max_iterations: u64,

    /// K-means convergence tolerance.
    pub tolerance: f64,

    /// K-means restarts; the run with the lowest inertia wins.
    pub n_runs: usize,

    pub seed: u64,

    /// Log completion and cluster sizes.
    pub verbose: bool,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            mode: ClusterMode::KMeans,
            n_clusters: Some(10),
            dbscan_eps: 3.0,
            dbscan_min_points: 5,
            metric: DbscanMetric::Euclidean,
            linkage: Linkage::Ward,
            distance_threshold: None,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
            seed: 42,
            verbose: false,
        }
    }
}

impl ClusterParams {
    pub fn kmeans(n_clusters: usize) -> Self {
        Self {
            mode: ClusterMode::KMeans,
            n_clusters: Some(n_clusters),
            ..Self::default()
        }
    }

    pub fn dbscan(eps: f64, min_points: usize) -> Self {
        Self {
            mode: ClusterMode::Dbscan,
            dbscan_eps: eps,
            dbscan_min_points: min_points,
            ..Self::default()
        }
    }

    pub fn hierarchical(n_clusters: Option<usize>, linkage: Linkage) -> Self {
        Self {
            mode: ClusterMode::Hierarchical,
            n_clusters,
            linkage,
            ..Self::default()
        }
    }

    /// Check the fields the selected mode reads.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            ClusterMode::KMeans => {
                match self.n_clusters {
                    None | Some(0) => {
                        return Err(ClusterError::invalid_parameter(
                            "n_clusters",
                            "k-means needs at least one cluster",
                        ))
                    }
                    Some(_) => {}
                }
                if self.n_runs == 0 {
                    return Err(ClusterError::invalid_parameter("n_runs", "must be > 0"));
                }
                if !(self.tolerance > 0.0) {
                    return Err(ClusterError::invalid_parameter("tolerance", "must be > 0"));
                }
            }
            ClusterMode::Dbscan => {
                if !(self.dbscan_eps > 0.0) {
                    return Err(ClusterError::invalid_parameter("dbscan_eps", "must be > 0"));
                }
                if self.dbscan_min_points == 0 {
                    return Err(ClusterError::invalid_parameter(
                        "dbscan_min_points",
                        "must be > 0",
                    ));
                }
            }
            ClusterMode::Hierarchical => {
                if self.n_clusters.is_some() && self.distance_threshold.is_some() {
                    return Err(ClusterError::invalid_parameter(
                        "distance_threshold",
                        "exactly one of n_clusters and distance_threshold may be set",
                    ));
                }
                if self.n_clusters == Some(0) {
                    return Err(ClusterError::invalid_parameter("n_clusters", "must be > 0"));
                }
                if let Some(threshold) = self.distance_threshold {
                    if !(threshold >= 0.0) {
                        return Err(ClusterError::invalid_parameter(
                            "distance_threshold",
                            "must be >= 0",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
