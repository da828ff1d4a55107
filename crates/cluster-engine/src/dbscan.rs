//! DBSCAN via `linfa-clustering`.

use crate::{ClusterParams, DbscanMetric, Result};
use linfa::traits::*;
use linfa_clustering::Dbscan;
use linfa_nn::distance::{L1Dist, L2Dist, LInfDist};
use linfa_nn::CommonNearestNeighbour;
use ndarray::ArrayView2;

/// Label every sample with its density cluster, `None` for noise.
pub(crate) fn fit_dbscan(records: ArrayView2<'_, f64>, params: &ClusterParams) -> Result<Vec<Option<usize>>> {
    let eps = params.dbscan_eps;
    let min_points = params.dbscan_min_points;

    let memberships = match params.metric {
        DbscanMetric::Euclidean => Dbscan::params_with(min_points, L2Dist, CommonNearestNeighbour::KdTree)
            .tolerance(eps)
            .transform(&records)?,
        DbscanMetric::Manhattan => Dbscan::params_with(min_points, L1Dist, CommonNearestNeighbour::KdTree)
            .tolerance(eps)
            .transform(&records)?,
        DbscanMetric::Chebyshev => Dbscan::params_with(min_points, LInfDist, CommonNearestNeighbour::KdTree)
            .tolerance(eps)
            .transform(&records)?,
    };
    Ok(memberships.to_vec())
}
