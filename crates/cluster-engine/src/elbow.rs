//! K-means inertia over a range of cluster counts.

use crate::kmeans::fit_kmeans;
use crate::{check_records, ClusterError, ClusterParams, Result};
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Inertia of the best k-means fit with `k` clusters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub inertia: f64,
}

/// Fit k-means for every `k` in `ks`, in parallel.
///
/// Only the k-means fields of `params` are used. Points come back in the
/// order of `ks`.
pub fn elbow_sweep(
    records: ArrayView2<'_, f64>,
    ks: &[usize],
    params: &ClusterParams,
) -> Result<Vec<ElbowPoint>> {
    check_records(records)?;
    if let Some(&k) = ks.iter().find(|k| **k == 0 || **k > records.nrows()) {
        return Err(if k == 0 {
            ClusterError::invalid_parameter("k", "must be > 0")
        } else {
            ClusterError::TooManyClusters {
                requested: k,
                samples: records.nrows(),
            }
        });
    }

    info!(samples = records.nrows(), runs = ks.len(), "Starting elbow sweep");
    let points = ks
        .par_iter()
        .map(|&k| {
            let fit = fit_kmeans(records, k, params)?;
            Ok(ElbowPoint {
                k,
                inertia: fit.inertia,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Finished elbow sweep");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_blob_points;

    #[test]
    fn test_inertia_drops_until_true_k() {
        let centers = vec![vec![0.0, 0.0], vec![20.0, 0.0], vec![0.0, 20.0]];
        let (points, _) = create_blob_points(&centers, 20, 1.0, 3);
        let sweep = elbow_sweep(points.view(), &[1, 2, 3, 4], &ClusterParams::default()).unwrap();

        assert_eq!(sweep.iter().map(|p| p.k).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(sweep[0].inertia > sweep[1].inertia);
        assert!(sweep[1].inertia > sweep[2].inertia);
        // Past the true k the gain is small.
        assert!(sweep[1].inertia - sweep[2].inertia > 10.0 * (sweep[2].inertia - sweep[3].inertia));
    }

    #[test]
    fn test_k_larger_than_samples_rejected() {
        let (points, _) = create_blob_points(&[vec![0.0]], 3, 0.1, 0);
        assert!(matches!(
            elbow_sweep(points.view(), &[2, 4], &ClusterParams::default()),
            Err(ClusterError::TooManyClusters { requested: 4, samples: 3 })
        ));
    }
}
