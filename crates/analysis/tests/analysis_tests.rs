//! The three analyses on a two-water-mass synthetic field with a land column.

use analysis::{
    single_chemical_clustering, timestep_clustering, timewise_clustering, AnalysisError,
};
use cluster_engine::{ClusterParams, Linkage};
use field_processor::{cluster_sizes, OceanField};
use ocean_common::{Chemical, ChemicalSelection};
use test_utils::{apply_land_mask, create_land_mask, create_two_region_field};

const N_TIMES: usize = 24;
const N_LAT: usize = 6;
const N_LON: usize = 5;

fn field() -> OceanField {
    let mut data = create_two_region_field(N_TIMES, N_LAT, N_LON, 5);
    apply_land_mask(&mut data, &create_land_mask(N_LAT, N_LON, 1));
    OceanField::new(data).unwrap()
}

#[test]
fn test_single_chemical_separates_water_masses() {
    let field = field();
    let report = single_chemical_clustering(&field, Chemical::Chl, &ClusterParams::kmeans(2)).unwrap();

    assert_eq!(report.labels.dim(), (N_LAT, N_LON));
    assert_eq!(report.cluster_sizes.iter().sum::<usize>(), N_LAT * (N_LON - 1));
    for i in 0..N_LAT {
        assert!(report.labels[[i, 0]].is_nan(), "land cell ({}, 0) was labelled", i);
        for j in 1..N_LON {
            let same_half = (i < N_LAT / 2) == (0 < N_LAT / 2);
            assert_eq!(report.labels[[i, j]] == report.labels[[0, 1]], same_half);
        }
    }
    assert!(report.silhouette.unwrap() > 0.8);
}

#[test]
fn test_timestep_clustering_with_dbscan() {
    let field = field();
    // DOXY differs by 30 between the masses, jitter stays within a few units.
    let report = timestep_clustering(&field, 3, &ClusterParams::dbscan(15.0, 3)).unwrap();
    assert_eq!(report.n_clusters(), Some(2));
    assert_eq!(report.outcome.noise_count(), 0);
    assert_eq!(report.cluster_sizes, vec![12, 12]);
}

#[test]
fn test_sorted_report_ranks_by_size() {
    let mut data = create_two_region_field(4, 4, 4, 9);
    // Rows 0..3 become one coastal mass, row 3 a small dilute one.
    for t in 0..4 {
        for j in 0..4 {
            for c in 0..4 {
                data[[t, 3, j, c]] = data[[t, 0, j, c]] / 10.0;
                data[[t, 2, j, c]] = data[[t, 0, j, c]];
            }
        }
    }
    let field = OceanField::new(data).unwrap();
    let report = timestep_clustering(&field, 0, &ClusterParams::kmeans(2)).unwrap();
    let sorted = report.sorted_by_size();

    assert_eq!(sorted.cluster_sizes, vec![4, 12]);
    assert_eq!(sorted.labels[[3, 0]], 0.0);
    assert_eq!(sorted.labels[[0, 0]], 1.0);

    // Per-sample labels follow the same renumbering as the grid.
    assert_eq!(cluster_sizes(&sorted.outcome.labels, 2), vec![4, 12]);
    let grid_labels: Vec<Option<usize>> = sorted.labels.iter().map(|v| Some(*v as usize)).collect();
    assert_eq!(sorted.outcome.labels, grid_labels);
}

#[test]
fn test_timewise_at_location() {
    let field = field();
    let selection = ChemicalSelection::from_chemicals(&[Chemical::Chl, Chemical::Doxy]);
    let params = ClusterParams::hierarchical(Some(2), Linkage::Ward);
    let report = timewise_clustering(&field, Some((0, 2)), &selection, &params).unwrap();

    assert_eq!(report.labels.len(), N_TIMES);
    assert!(report.labels.iter().all(|l| *l == 0.0 || *l == 1.0));
    assert_eq!(report.cluster_sizes.iter().sum::<usize>(), N_TIMES);
    assert_eq!(report.outcome.dendrogram.as_ref().unwrap().merges().len(), N_TIMES - 1);
}

#[test]
fn test_timewise_spatial_mean_without_cut() {
    let field = field();
    let params = ClusterParams::hierarchical(None, Linkage::Average);
    let report = timewise_clustering(&field, None, &ChemicalSelection::all(), &params).unwrap();

    assert!(report.labels.is_empty());
    assert!(report.cluster_sizes.is_empty());
    assert_eq!(report.silhouette, None);
    assert!(report.outcome.dendrogram.is_some());

    let json = serde_json::to_value(report.summary()).unwrap();
    assert_eq!(json["mode"], "hierarchical");
    assert_eq!(json["n_clusters"], serde_json::Value::Null);
}

#[test]
fn test_timewise_on_land_reaches_backend() {
    let field = field();
    let err = timewise_clustering(
        &field,
        Some((0, 0)),
        &ChemicalSelection::all(),
        &ClusterParams::kmeans(2),
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::Cluster(_)));
}

#[test]
fn test_invalid_chemical_index() {
    let data = create_two_region_field(4, 2, 2, 1);
    let subset = data.slice(ndarray::s![.., .., .., 0..2]).to_owned();
    let field = OceanField::new(subset).unwrap();
    let err = single_chemical_clustering(&field, Chemical::Phos, &ClusterParams::kmeans(2)).unwrap_err();
    assert!(err.is_user_error());
}
