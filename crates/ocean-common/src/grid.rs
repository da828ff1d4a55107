//! Curvilinear lon/lat coordinates for the model grid.

use crate::{BoundingBox, OceanError, OceanResult};
use ndarray::{Array2, Array3, ArrayView2, Axis};

/// Longitude and latitude of every grid cell.
///
/// Stored as the `lons_lats` array shipped with the model output:
/// shape `(n_lat, n_lon, 2)` with longitude in slot 0 and latitude in slot 1.
/// Row index follows the latitude axis of the data matrix.
#[derive(Debug, Clone)]
pub struct LonLatGrid {
    coords: Array3<f64>,
}

impl LonLatGrid {
    /// Wrap a `(n_lat, n_lon, 2)` coordinate array.
    pub fn new(coords: Array3<f64>) -> OceanResult<Self> {
        let shape = coords.shape();
        if shape[2] != 2 {
            return Err(OceanError::shape_mismatch(
                "(n_lat, n_lon, 2)",
                format!("{:?}", shape),
            ));
        }
        if shape[0] == 0 || shape[1] == 0 {
            return Err(OceanError::EmptyData("coordinate grid has no cells".into()));
        }
        Ok(Self { coords })
    }

    /// Build a regular grid from 1-D longitude and latitude axes.
    pub fn regular(lons: &[f64], lats: &[f64]) -> OceanResult<Self> {
        let mut coords = Array3::<f64>::zeros((lats.len(), lons.len(), 2));
        for (i, lat) in lats.iter().enumerate() {
            for (j, lon) in lons.iter().enumerate() {
                coords[[i, j, 0]] = *lon;
                coords[[i, j, 1]] = *lat;
            }
        }
        Self::new(coords)
    }

    /// Number of rows (latitude axis).
    pub fn n_lat(&self) -> usize {
        self.coords.shape()[0]
    }

    /// Number of columns (longitude axis).
    pub fn n_lon(&self) -> usize {
        self.coords.shape()[1]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_lat(), self.n_lon())
    }

    pub fn lon(&self, i: usize, j: usize) -> f64 {
        self.coords[[i, j, 0]]
    }

    pub fn lat(&self, i: usize, j: usize) -> f64 {
        self.coords[[i, j, 1]]
    }

    pub fn lons(&self) -> ArrayView2<'_, f64> {
        self.coords.index_axis(Axis(2), 0)
    }

    pub fn lats(&self) -> ArrayView2<'_, f64> {
        self.coords.index_axis(Axis(2), 1)
    }

    /// Bounding box over all finite coordinates.
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.lons()
                .iter()
                .zip(self.lats().iter())
                .map(|(lon, lat)| (*lon, *lat)),
        )
    }

    /// True when latitude increases with the row index, i.e. the first row
    /// is the southernmost one and must be drawn at the bottom.
    pub fn lat_increases_with_row(&self) -> bool {
        let first = row_mean(&self.lats(), 0);
        let last = row_mean(&self.lats(), self.n_lat() - 1);
        match (first, last) {
            (Some(first), Some(last)) => last > first,
            _ => true,
        }
    }

    /// Check that a data layer has the same cell layout as this grid.
    pub fn check_layer_shape(&self, layer: &Array2<f64>) -> OceanResult<()> {
        let shape = (layer.nrows(), layer.ncols());
        if shape != self.shape() {
            return Err(OceanError::shape_mismatch(
                format!("{:?}", self.shape()),
                format!("{:?}", shape),
            ));
        }
        Ok(())
    }

    pub fn as_array(&self) -> &Array3<f64> {
        &self.coords
    }
}

fn row_mean(values: &ArrayView2<'_, f64>, row: usize) -> Option<f64> {
    let finite: Vec<f64> = values
        .row(row)
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_grid_coordinates() {
        let grid = LonLatGrid::regular(&[10.0, 11.0, 12.0], &[40.0, 41.0]).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.lon(1, 2), 12.0);
        assert_eq!(grid.lat(1, 2), 41.0);
        assert!(grid.lat_increases_with_row());
    }

    #[test]
    fn test_bbox_ignores_nan_cells() {
        let mut coords = LonLatGrid::regular(&[0.0, 5.0], &[30.0, 35.0])
            .unwrap()
            .as_array()
            .clone();
        coords[[1, 1, 0]] = f64::NAN;
        coords[[1, 1, 1]] = f64::NAN;
        let grid = LonLatGrid::new(coords).unwrap();
        let bbox = grid.bbox().unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 30.0, 5.0, 35.0));
    }

    #[test]
    fn test_wrong_last_axis_rejected() {
        let coords = Array3::<f64>::zeros((2, 2, 3));
        assert!(LonLatGrid::new(coords).is_err());
    }

    #[test]
    fn test_north_first_rows() {
        let grid = LonLatGrid::regular(&[0.0, 1.0], &[50.0, 45.0, 40.0]).unwrap();
        assert!(!grid.lat_increases_with_row());
    }
}
