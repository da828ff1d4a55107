//! Flattening ("straightening") a field into clustering samples.
//!
//! Every builder returns a [`FeatureMatrix`]: one row per sample plus the
//! origin of that row, so labels can later be written back to the cell or
//! time step they came from.

use crate::{OceanField, Result};
use ndarray::{s, Array2, ArrayView3, Axis};
use ocean_common::ChemicalSelection;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a sample row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleOrigin {
    /// A grid cell (row, column).
    Cell { lat: usize, lon: usize },
    /// A time step.
    Time(usize),
}

/// Samples ready for a clustering backend.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Samples × features.
    pub records: Array2<f64>,
    /// Origin of each row of `records`.
    pub origins: Vec<SampleOrigin>,
    /// `(n_lat, n_lon)` of the source grid for cell samples.
    pub grid_shape: Option<(usize, usize)>,
}

impl FeatureMatrix {
    pub fn n_samples(&self) -> usize {
        self.records.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.records.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }
}

/// One sample per grid cell whose value is finite at every time step.
///
/// `series` is a time × lat × lon array (one chemical through time); each
/// sample is the cell's time series.
pub fn spatial_features(series: ArrayView3<'_, f64>) -> Result<FeatureMatrix> {
    let (n_times, n_lat, n_lon) = series.dim();
    let mut values = Vec::new();
    let mut origins = Vec::new();

    for i in 0..n_lat {
        for j in 0..n_lon {
            let cell = series.slice(s![.., i, j]);
            if cell.iter().all(|v| v.is_finite()) {
                values.extend(cell.iter().copied());
                origins.push(SampleOrigin::Cell { lat: i, lon: j });
            }
        }
    }

    debug!(
        samples = origins.len(),
        cells = n_lat * n_lon,
        "Built spatial features"
    );
    Ok(FeatureMatrix {
        records: Array2::from_shape_vec((origins.len(), n_times), values)?,
        origins,
        grid_shape: Some((n_lat, n_lon)),
    })
}

/// One sample per grid cell whose chemicals are all finite.
///
/// `layer` is a lat × lon × chemical array (one time step); each sample is
/// the cell's chemical vector.
pub fn timestep_features(layer: ArrayView3<'_, f64>) -> Result<FeatureMatrix> {
    let (n_lat, n_lon, n_chem) = layer.dim();
    let mut values = Vec::new();
    let mut origins = Vec::new();

    for i in 0..n_lat {
        for j in 0..n_lon {
            let cell = layer.slice(s![i, j, ..]);
            if cell.iter().all(|v| v.is_finite()) {
                values.extend(cell.iter().copied());
                origins.push(SampleOrigin::Cell { lat: i, lon: j });
            }
        }
    }

    debug!(
        samples = origins.len(),
        cells = n_lat * n_lon,
        "Built timestep features"
    );
    Ok(FeatureMatrix {
        records: Array2::from_shape_vec((origins.len(), n_chem), values)?,
        origins,
        grid_shape: Some((n_lat, n_lon)),
    })
}

/// One sample per time step: the selected chemicals at a single cell.
///
/// Values are taken as-is, so a NaN in the cell's history reaches the
/// clustering backend, which rejects it.
pub fn location_features(
    field: &OceanField,
    lat: usize,
    lon: usize,
    selection: &ChemicalSelection,
) -> Result<FeatureMatrix> {
    field.check_location(lat, lon)?;
    let positions = field.selected_positions(selection)?;
    let data = field.data();

    let records = Array2::from_shape_fn((field.n_times(), positions.len()), |(t, c)| {
        data[[t, lat, lon, positions[c]]]
    });
    Ok(FeatureMatrix {
        records,
        origins: (0..field.n_times()).map(SampleOrigin::Time).collect(),
        grid_shape: None,
    })
}

/// One sample per time step: the spatial mean of each selected chemical,
/// ignoring NaN cells.
pub fn spatial_mean_features(
    field: &OceanField,
    selection: &ChemicalSelection,
) -> Result<FeatureMatrix> {
    let positions = field.selected_positions(selection)?;
    let data = field.data();
    let mut records = Array2::<f64>::from_elem((field.n_times(), positions.len()), f64::NAN);

    for (t, step) in data.axis_iter(Axis(0)).enumerate() {
        for (c, &chem) in positions.iter().enumerate() {
            let layer = step.index_axis(Axis(2), chem);
            let (sum, count) = layer
                .iter()
                .filter(|v| v.is_finite())
                .fold((0.0_f64, 0usize), |(sum, count), v| (sum + *v, count + 1));
            if count > 0 {
                records[[t, c]] = sum / count as f64;
            }
        }
    }

    Ok(FeatureMatrix {
        records,
        origins: (0..field.n_times()).map(SampleOrigin::Time).collect(),
        grid_shape: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};
    use ocean_common::Chemical;

    #[test]
    fn test_spatial_features_skip_incomplete_cells() {
        let mut series = Array3::from_shape_fn((3, 2, 2), |(t, i, j)| (t + i * 10 + j * 100) as f64);
        series[[1, 0, 1]] = f64::NAN;
        let features = spatial_features(series.view()).unwrap();

        assert_eq!(features.n_samples(), 3);
        assert_eq!(features.n_features(), 3);
        assert_eq!(
            features.origins,
            vec![
                SampleOrigin::Cell { lat: 0, lon: 0 },
                SampleOrigin::Cell { lat: 1, lon: 0 },
                SampleOrigin::Cell { lat: 1, lon: 1 },
            ]
        );
        // First kept row is cell (0, 0), second is (1, 0).
        assert_eq!(features.records.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(features.records.row(1).to_vec(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_timestep_features_rows_are_chemical_vectors() {
        let mut layer = Array3::from_shape_fn((2, 1, 4), |(i, _, c)| (i * 10 + c) as f64);
        layer[[0, 0, 3]] = f64::NAN;
        let features = timestep_features(layer.view()).unwrap();
        assert_eq!(features.n_samples(), 1);
        assert_eq!(features.origins[0], SampleOrigin::Cell { lat: 1, lon: 0 });
        assert_eq!(features.records.row(0).to_vec(), vec![10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_all_missing_gives_empty_matrix() {
        let layer = Array3::<f64>::from_elem((2, 2, 4), f64::NAN);
        let features = timestep_features(layer.view()).unwrap();
        assert!(features.is_empty());
        assert_eq!(features.n_features(), 4);
    }

    #[test]
    fn test_location_features() {
        let data = Array4::from_shape_fn((3, 2, 2, 4), |(t, i, j, c)| {
            (t * 1000 + i * 100 + j * 10 + c) as f64
        });
        let field = OceanField::new(data).unwrap();
        let selection = ChemicalSelection::from_chemicals(&[Chemical::Chl, Chemical::Nitr]);
        let features = location_features(&field, 1, 0, &selection).unwrap();
        assert_eq!(features.records.dim(), (3, 2));
        assert_eq!(features.records.row(2).to_vec(), vec![2100.0, 2102.0]);
        assert_eq!(features.origins[2], SampleOrigin::Time(2));
        assert!(location_features(&field, 2, 0, &selection).is_err());
    }

    #[test]
    fn test_spatial_mean_ignores_nan() {
        let mut data = Array4::<f64>::zeros((2, 2, 1, 4));
        data[[0, 0, 0, 0]] = 1.0;
        data[[0, 1, 0, 0]] = 3.0;
        data[[1, 0, 0, 0]] = f64::NAN;
        data[[1, 1, 0, 0]] = 5.0;
        data[[1, 0, 0, 1]] = f64::NAN;
        data[[1, 1, 0, 1]] = f64::NAN;
        let field = OceanField::new(data).unwrap();
        let features = spatial_mean_features(&field, &ChemicalSelection::all()).unwrap();
        assert_eq!(features.records[[0, 0]], 2.0);
        assert_eq!(features.records[[1, 0]], 5.0);
        assert!(features.records[[1, 1]].is_nan());
    }
}
