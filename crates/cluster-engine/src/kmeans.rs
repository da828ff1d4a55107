//! K-means via `linfa-clustering`.

use crate::{ClusterParams, Result};
use linfa::traits::*;
use linfa::DatasetBase;
use linfa_clustering::{KMeans, KMeansInit};
use ndarray::{ArrayView2, Zip};
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use tracing::debug;

/// Labels and inertia of a k-means fit.
///
/// `inertia` is the sum of squared distances from each sample to its
/// centroid, not linfa's per-sample mean.
#[derive(Debug, Clone)]
pub(crate) struct KMeansFit {
    pub labels: Vec<usize>,
    pub inertia: f64,
}

/// Fit `k` centroids with k-means++ initialisation and label every sample.
pub(crate) fn fit_kmeans(records: ArrayView2<'_, f64>, k: usize, params: &ClusterParams) -> Result<KMeansFit> {
    let rng = Isaac64Rng::seed_from_u64(params.seed);
    let dataset = DatasetBase::from(records.to_owned());

    let model = KMeans::params_with_rng(k, rng)
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(params.n_runs)
        .max_n_iterations(params.max_iterations)
        .tolerance(params.tolerance)
        .fit(&dataset)?;

    let labels = model.predict(dataset.records());
    let centroids = model.centroids();
    let mut inertia = 0.0;
    Zip::from(records.rows()).and(&labels).for_each(|row, &label| {
        inertia += row
            .iter()
            .zip(centroids.row(label).iter())
            .map(|(x, c)| (x - c) * (x - c))
            .sum::<f64>();
    });
    debug!(k, inertia, "K-means converged");

    Ok(KMeansFit {
        labels: labels.to_vec(),
        inertia,
    })
}
