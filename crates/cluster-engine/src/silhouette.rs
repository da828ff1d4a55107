//! Silhouette score over labelled samples.

use linfa::metrics::SilhouetteScore;
use linfa::DatasetBase;
use ndarray::{Array1, ArrayView2, Axis};
use std::collections::BTreeSet;
use tracing::debug;

/// Mean silhouette coefficient of the samples that carry a label.
///
/// Noise samples (`None`) are left out. Returns `None` when fewer than two
/// clusters or fewer than two labelled samples remain, or when every
/// labelled sample is its own cluster.
pub fn silhouette_score(records: ArrayView2<'_, f64>, labels: &[Option<usize>]) -> Option<f64> {
    if records.nrows() != labels.len() {
        return None;
    }

    let kept: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| label.map(|_| i))
        .collect();
    let targets: Array1<usize> = kept.iter().filter_map(|i| labels[*i]).collect();
    let clusters: BTreeSet<usize> = targets.iter().copied().collect();
    if kept.len() < 2 || clusters.len() < 2 || clusters.len() >= kept.len() {
        return None;
    }

    let dataset = DatasetBase::new(records.select(Axis(0), &kept), targets);
    match dataset.silhouette_score() {
        Ok(score) if score.is_finite() => Some(score),
        Ok(score) => {
            debug!(score, "Discarding non-finite silhouette score");
            None
        }
        Err(e) => {
            debug!(error = %e, "Silhouette score unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_well_separated_clusters_score_high() {
        let records = array![[0.0, 0.0], [0.1, 0.0], [0.0, 0.1], [10.0, 10.0], [10.1, 10.0], [10.0, 10.1]];
        let labels = vec![Some(0), Some(0), Some(0), Some(1), Some(1), Some(1)];
        let score = silhouette_score(records.view(), &labels).unwrap();
        assert!(score > 0.9, "score was {}", score);
    }

    #[test]
    fn test_single_cluster_has_no_score() {
        let records = array![[0.0], [1.0], [2.0]];
        assert_eq!(silhouette_score(records.view(), &[Some(0), Some(0), Some(0)]), None);
    }

    #[test]
    fn test_noise_is_excluded() {
        let records = array![[0.0], [0.1], [5.0], [5.1], [100.0]];
        let labels = vec![Some(0), Some(0), Some(1), Some(1), None];
        let score = silhouette_score(records.view(), &labels).unwrap();
        assert!(score > 0.9);

        let only_noise = vec![None; 5];
        assert_eq!(silhouette_score(records.view(), &only_noise), None);
    }
}
