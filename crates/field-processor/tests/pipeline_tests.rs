//! Load → average → features → labels over an on-disk synthetic dataset.

use field_processor::{
    average_data, load_field, load_field_with_chemicals, load_lons_lats, save_field,
    scatter_labels, spatial_features, timestep_features, FieldError, SampleOrigin, LONS_LATS_KEY,
    MATRIX_KEY,
};
use ocean_common::{Chemical, ChemicalSelection};
use test_utils::{assert_approx_eq, require_test_file, TempDataset};

#[test]
fn test_load_matches_written_field() {
    let dataset = TempDataset::create(6, 4, 3);
    let field = load_field(&dataset.data_path, MATRIX_KEY).unwrap();

    assert_eq!(field.n_times(), 6);
    assert_eq!(field.grid_shape(), (4, 3));
    assert_eq!(field.chemicals(), &Chemical::ALL);
    assert!(field.data()[[0, 2, 0, 1]].is_nan());
    assert_approx_eq!(field.data()[[5, 3, 2, 2]], dataset.field[[5, 3, 2, 2]], 1e-12);
}

#[test]
fn test_missing_key_lists_available_entries() {
    let dataset = TempDataset::create(2, 2, 2);
    match load_field(&dataset.data_path, "average") {
        Err(FieldError::MissingEntry { name, available }) => {
            assert_eq!(name, "average");
            assert_eq!(available, vec!["matrix.npy".to_string()]);
        }
        other => panic!("expected MissingEntry, got {:?}", other.map(|f| f.n_times())),
    }
}

#[test]
fn test_lons_lats_loaded() {
    let dataset = TempDataset::create(2, 4, 3);
    let grid = load_lons_lats(&dataset.lons_lats_path, LONS_LATS_KEY).unwrap();
    assert_eq!(grid.shape(), (4, 3));
    assert_approx_eq!(grid.lon(0, 2), dataset.lons_lats[[0, 2, 0]], 1e-12);
    assert!(grid.lat_increases_with_row());
}

#[test]
fn test_cached_average_round_trip() {
    let dataset = TempDataset::create(8, 4, 3);
    let field = load_field(&dataset.data_path, MATRIX_KEY).unwrap();
    let selection = ChemicalSelection::from_chemicals(&[Chemical::Chl, Chemical::Nitr]);
    let averaged = average_data(&field, &selection, 4).unwrap();

    let cache = dataset.path().join("average.npz");
    save_field(&cache, MATRIX_KEY, &averaged).unwrap();
    let reloaded = load_field_with_chemicals(&cache, MATRIX_KEY, selection.to_vec()).unwrap();

    assert_eq!(reloaded.n_times(), 2);
    assert_eq!(reloaded.chemicals(), &[Chemical::Chl, Chemical::Nitr]);
    assert_approx_eq!(
        reloaded.data()[[1, 1, 1, 1]],
        averaged.data()[[1, 1, 1, 1]],
        1e-12
    );
}

#[test]
fn test_land_column_has_no_samples() {
    let dataset = TempDataset::create(5, 4, 3);
    let field = load_field(&dataset.data_path, MATRIX_KEY).unwrap();

    let spatial = spatial_features(field.series_of(Chemical::Doxy).unwrap()).unwrap();
    assert_eq!(spatial.n_samples(), 8);
    assert!(spatial
        .origins
        .iter()
        .all(|o| !matches!(o, SampleOrigin::Cell { lon: 0, .. })));

    let layer = timestep_features(field.timestep(3).unwrap()).unwrap();
    assert_eq!(layer.n_features(), 4);

    let labels = vec![Some(0); layer.n_samples()];
    let grid = scatter_labels(&labels, &layer.origins, field.grid_shape()).unwrap();
    assert!(grid[[1, 0]].is_nan());
    assert_eq!(grid[[1, 1]], 0.0);
}

#[test]
fn test_real_model_output() {
    let path = require_test_file!("av_model_data30.npz");
    let field = load_field(path, MATRIX_KEY).unwrap();
    assert_eq!(field.n_chemicals(), 4);
    assert!(field.missing_fraction() < 1.0);
}
