//! Agglomerative (hierarchical) clustering via `kodama`.
//!
//! Pairwise Euclidean distances go to [`kodama::linkage`]; the merge steps
//! it returns are kept as a [`Dendrogram`] that can be cut by cluster count
//! or by distance.
//!
//! Merges follow the scipy convention: sorted by distance, leaves are `0..n`
//! and merge `k` creates node `n + k`.

use crate::{ClusterError, Linkage, Result};
use kodama::Method;
use linfa_nn::distance::{Distance, L2Dist};
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One merge of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Smaller node id of the pair.
    pub left: usize,
    pub right: usize,
    /// Linkage distance between the two nodes.
    pub distance: f64,
    /// Number of samples under the new node.
    pub size: usize,
}

/// Full merge tree over `n_samples` leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    n_samples: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Merges in order of increasing distance.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Flat labels with exactly `n_clusters` clusters.
    pub fn cut(&self, n_clusters: usize) -> Result<Vec<usize>> {
        if n_clusters == 0 {
            return Err(ClusterError::invalid_parameter("n_clusters", "must be > 0"));
        }
        if n_clusters > self.n_samples {
            return Err(ClusterError::TooManyClusters {
                requested: n_clusters,
                samples: self.n_samples,
            });
        }
        Ok(self.labels_after(self.n_samples - n_clusters))
    }

    /// Flat labels keeping only merges closer than `threshold`.
    pub fn cut_at_distance(&self, threshold: f64) -> Vec<usize> {
        let applied = self
            .merges
            .iter()
            .take_while(|m| m.distance < threshold)
            .count();
        self.labels_after(applied)
    }

    /// Labels after applying the first `applied` merges. Clusters are
    /// numbered in order of their lowest sample index.
    fn labels_after(&self, applied: usize) -> Vec<usize> {
        let n = self.n_samples;
        let mut parent: Vec<usize> = (0..n + applied).collect();
        for (k, merge) in self.merges.iter().take(applied).enumerate() {
            parent[merge.left] = n + k;
            parent[merge.right] = n + k;
        }

        let mut root_label = vec![usize::MAX; n + applied];
        let mut next = 0;
        (0..n)
            .map(|sample| {
                let mut node = sample;
                while parent[node] != node {
                    node = parent[node];
                }
                if root_label[node] == usize::MAX {
                    root_label[node] = next;
                    next += 1;
                }
                root_label[node]
            })
            .collect()
    }
}

impl From<Linkage> for Method {
    fn from(linkage: Linkage) -> Self {
        match linkage {
            Linkage::Ward => Method::Ward,
            Linkage::Complete => Method::Complete,
            Linkage::Average => Method::Average,
            Linkage::Single => Method::Single,
        }
    }
}

/// Upper triangle of the pairwise distance matrix, row by row.
fn condensed_distances(records: ArrayView2<'_, f64>) -> Vec<f64> {
    let n = records.nrows();
    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let row = records.row(i);
            ((i + 1)..n).map(move |j| L2Dist.distance(row, records.row(j)))
        })
        .collect()
}

/// Grow the full tree over the rows of `records`.
pub fn agglomerate(records: ArrayView2<'_, f64>, linkage: Linkage) -> Result<Dendrogram> {
    let n = records.nrows();
    if n == 0 {
        return Err(ClusterError::EmptyInput);
    }
    if n == 1 {
        return Ok(Dendrogram {
            n_samples: 1,
            merges: Vec::new(),
        });
    }

    let mut condensed = condensed_distances(records);
    let tree = kodama::linkage(&mut condensed, n, linkage.into());
    let merges = tree
        .steps()
        .iter()
        .map(|step| Merge {
            left: step.cluster1.min(step.cluster2),
            right: step.cluster1.max(step.cluster2),
            distance: step.dissimilarity,
            size: step.size,
        })
        .collect();

    debug!(samples = n, linkage = %linkage, "Built merge tree");
    Ok(Dendrogram { n_samples: n, merges })
}
