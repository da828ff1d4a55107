//! Clustering analyses over an [`OceanField`].
//!
//! Three questions are asked of the model output:
//!
//! - **single chemical**: which cells have a similar history of one
//!   chemical? ([`single_chemical_clustering`])
//! - **timestep**: which cells have a similar chemical make-up on one day?
//!   ([`timestep_clustering`])
//! - **timewise**: which days look alike, at one cell or on average over the
//!   basin? ([`timewise_clustering`])
//!
//! Each builds a feature matrix with `field-processor`, clusters it with
//! `cluster-engine` and lays the labels back out as a grid or a series.

pub mod error;
pub mod report;

pub use error::{AnalysisError, Result};
pub use report::{ClusteringReport, ReportSummary, SpatialReport, TemporalReport};

use cluster_engine::{cluster, ClusterOutcome, ClusterParams};
use field_processor::{
    label_series, location_features, scatter_labels, spatial_features, spatial_mean_features,
    timestep_features, FeatureMatrix, OceanField,
};
use ndarray::ArrayView3;
use ocean_common::{Chemical, ChemicalSelection};
use tracing::info;

fn run(features: &FeatureMatrix, params: &ClusterParams, what: &str) -> Result<ClusterOutcome> {
    if features.is_empty() {
        return Err(AnalysisError::NoSamples(what.to_string()));
    }
    info!(
        analysis = what,
        samples = features.n_samples(),
        features = features.n_features(),
        "Clustering"
    );
    Ok(cluster(features.records.view(), params)?)
}

fn spatial_report(
    features: FeatureMatrix,
    shape: (usize, usize),
    params: &ClusterParams,
    what: &str,
) -> Result<SpatialReport> {
    let outcome = run(&features, params, what)?;
    let labels = match outcome.n_clusters {
        Some(_) => scatter_labels(&outcome.labels, &features.origins, shape)?,
        None => SpatialReport::empty_grid(shape),
    };
    Ok(ClusteringReport::new(outcome, labels, &features, params.verbose))
}

/// Cluster cells by the time series of one chemical.
pub fn single_chemical_clustering(
    field: &OceanField,
    chemical: Chemical,
    params: &ClusterParams,
) -> Result<SpatialReport> {
    let series = field.series_of(chemical)?;
    cluster_series(series, params)
}

/// Cluster cells of a time × lat × lon array by their time series.
///
/// Cells with a missing value at any time step are left out.
pub fn cluster_series(series: ArrayView3<'_, f64>, params: &ClusterParams) -> Result<SpatialReport> {
    let (_, n_lat, n_lon) = series.dim();
    let features = spatial_features(series)?;
    spatial_report(features, (n_lat, n_lon), params, "single chemical")
}

/// Cluster cells by their chemical vector at one time step.
pub fn timestep_clustering(
    field: &OceanField,
    timestep: usize,
    params: &ClusterParams,
) -> Result<SpatialReport> {
    let layer = field.timestep(timestep)?;
    cluster_layer(layer, params)
}

/// Cluster cells of a lat × lon × chemical array by their chemical vector.
pub fn cluster_layer(layer: ArrayView3<'_, f64>, params: &ClusterParams) -> Result<SpatialReport> {
    let (n_lat, n_lon, _) = layer.dim();
    let features = timestep_features(layer)?;
    spatial_report(features, (n_lat, n_lon), params, "timestep")
}

/// Cluster time steps by the selected chemicals, either at `location` or,
/// when it is `None`, by their spatial mean.
///
/// When a hierarchical tree is grown without a cut, the report carries the
/// dendrogram but no labels, sizes or silhouette.
pub fn timewise_clustering(
    field: &OceanField,
    location: Option<(usize, usize)>,
    selection: &ChemicalSelection,
    params: &ClusterParams,
) -> Result<TemporalReport> {
    let features = match location {
        Some((lat, lon)) => location_features(field, lat, lon, selection)?,
        None => spatial_mean_features(field, selection)?,
    };
    let outcome = run(&features, params, "timewise")?;
    let labels = match outcome.n_clusters {
        Some(_) => label_series(&outcome.labels, &features.origins)?,
        None => TemporalReport::empty_series(),
    };
    Ok(ClusteringReport::new(outcome, labels, &features, params.verbose))
}
