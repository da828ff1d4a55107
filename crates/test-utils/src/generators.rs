//! Test data generators for synthetic ocean model output.
//!
//! These generators create predictable, verifiable fields that can be used
//! across the test suite. All arrays use the `(time, lat, lon, chemical)`
//! layout with four chemicals in the order CHL, DOXY, NITR, PHOS.

use ndarray::{Array2, Array3, Array4, Axis};

/// Number of chemicals in a full field.
pub const N_CHEMICALS: usize = 4;

/// Typical coastal signature (CHL mg/m³, DOXY mmol/m³, NITR mmol/m³, PHOS mmol/m³).
pub const COASTAL: [f64; N_CHEMICALS] = [2.0, 220.0, 8.0, 0.6];

/// Typical open-sea signature.
pub const OFFSHORE: [f64; N_CHEMICALS] = [0.2, 250.0, 1.0, 0.1];

/// Creates a field with predictable values.
///
/// Each value is calculated as: `t * 1000 + lat * 100 + lon * 10 + chem`
///
/// # Example
///
/// ```
/// use test_utils::create_test_field;
///
/// let field = create_test_field(3, 2, 2);
/// assert_eq!(field.shape(), &[3, 2, 2, 4]);
/// assert_eq!(field[[2, 1, 0, 3]], 2103.0);
/// ```
pub fn create_test_field(n_times: usize, n_lat: usize, n_lon: usize) -> Array4<f64> {
    Array4::from_shape_fn((n_times, n_lat, n_lon, N_CHEMICALS), |(t, i, j, c)| {
        (t * 1000 + i * 100 + j * 10 + c) as f64
    })
}

/// Creates a land mask where the first `land_cols` columns are land.
pub fn create_land_mask(n_lat: usize, n_lon: usize, land_cols: usize) -> Array2<bool> {
    Array2::from_shape_fn((n_lat, n_lon), |(_, j)| j < land_cols)
}

/// Sets every value of a masked cell to NaN, at all times and chemicals.
pub fn apply_land_mask(field: &mut Array4<f64>, mask: &Array2<bool>) {
    for mut step in field.axis_iter_mut(Axis(0)) {
        for ((i, j), &land) in mask.indexed_iter() {
            if land {
                step.slice_mut(ndarray::s![i, j, ..]).fill(f64::NAN);
            }
        }
    }
}

/// Creates a field with two water masses.
///
/// Rows in the top half carry the [`COASTAL`] signature and rows in the
/// bottom half the [`OFFSHORE`] one. Each value gets a small seasonal cycle
/// (period 12 steps) and a deterministic jitter of at most 2%, so any
/// reasonable clustering separates the halves.
pub fn create_two_region_field(n_times: usize, n_lat: usize, n_lon: usize, seed: u32) -> Array4<f64> {
    let split = n_lat / 2;
    Array4::from_shape_fn((n_times, n_lat, n_lon, N_CHEMICALS), |(t, i, j, c)| {
        let base = if i < split { COASTAL[c] } else { OFFSHORE[c] };
        let season = 1.0 + 0.05 * (2.0 * std::f64::consts::PI * t as f64 / 12.0).sin();
        let hash = simple_hash((i * n_lon + j) as u32, (t * N_CHEMICALS + c) as u32, seed);
        base * season * (1.0 + 0.02 * unit_jitter(hash))
    })
}

/// Creates a seasonal series `mean + amplitude * sin(2πt / period)`.
pub fn create_seasonal_series(n_times: usize, period: f64, mean: f64, amplitude: f64) -> Vec<f64> {
    (0..n_times)
        .map(|t| mean + amplitude * (2.0 * std::f64::consts::PI * t as f64 / period).sin())
        .collect()
}

/// Creates `n_per_blob` points around each center, at most `spread` away
/// along each axis.
///
/// # Returns
///
/// The points (one per row, blob by blob) and the index of the blob each
/// point came from.
pub fn create_blob_points(
    centers: &[Vec<f64>],
    n_per_blob: usize,
    spread: f64,
    seed: u32,
) -> (Array2<f64>, Vec<usize>) {
    let n_features = centers.first().map(|c| c.len()).unwrap_or(0);
    let n = centers.len() * n_per_blob;
    let points = Array2::from_shape_fn((n, n_features), |(row, col)| {
        let blob = row / n_per_blob;
        let hash = simple_hash(row as u32, col as u32, seed);
        centers[blob][col] + spread * unit_jitter(hash)
    });
    let truth = (0..n).map(|row| row / n_per_blob).collect();
    (points, truth)
}

/// Creates a `(lat, lon, 2)` coordinate array on a regular grid.
///
/// Row 0 is the southernmost latitude. `[.., .., 0]` holds longitudes and
/// `[.., .., 1]` latitudes.
pub fn create_lons_lats(
    n_lat: usize,
    n_lon: usize,
    min_lon: f64,
    min_lat: f64,
    step: f64,
) -> Array3<f64> {
    Array3::from_shape_fn((n_lat, n_lon, 2), |(i, j, k)| {
        if k == 0 {
            min_lon + j as f64 * step
        } else {
            min_lat + i as f64 * step
        }
    })
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Maps a hash into `[-1, 1)`.
fn unit_jitter(hash: u32) -> f64 {
    (hash % 10_000) as f64 / 5_000.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_field() {
        let field = create_test_field(2, 3, 4);
        assert_eq!(field.shape(), &[2, 3, 4, 4]);
        assert_eq!(field[[0, 0, 0, 0]], 0.0);
        assert_eq!(field[[1, 2, 3, 1]], 1231.0);
    }

    #[test]
    fn test_land_mask_sets_nan_everywhere() {
        let mut field = create_test_field(3, 2, 3);
        let mask = create_land_mask(2, 3, 1);
        apply_land_mask(&mut field, &mask);
        for t in 0..3 {
            for c in 0..N_CHEMICALS {
                assert!(field[[t, 1, 0, c]].is_nan());
                assert!(!field[[t, 1, 1, c]].is_nan());
            }
        }
    }

    #[test]
    fn test_two_region_field_separates_halves() {
        let field = create_two_region_field(6, 4, 3, 7);
        // CHL is an order of magnitude apart between the halves.
        for t in 0..6 {
            assert!(field[[t, 0, 0, 0]] > 1.5);
            assert!(field[[t, 3, 2, 0]] < 0.3);
        }
    }

    #[test]
    fn test_two_region_field_deterministic() {
        let a = create_two_region_field(4, 4, 4, 42);
        let b = create_two_region_field(4, 4, 4, 42);
        let c = create_two_region_field(4, 4, 4, 43);
        assert_eq!(a, b, "Same seed should produce same data");
        assert_ne!(a, c, "Different seed should produce different data");
    }

    #[test]
    fn test_blob_points_stay_near_centers() {
        let centers = vec![vec![0.0, 0.0], vec![10.0, 10.0]];
        let (points, truth) = create_blob_points(&centers, 5, 0.5, 1);
        assert_eq!(points.dim(), (10, 2));
        assert_eq!(truth[4], 0);
        assert_eq!(truth[5], 1);
        for (row, blob) in truth.iter().enumerate() {
            for col in 0..2 {
                assert!((points[[row, col]] - centers[*blob][col]).abs() <= 0.5);
            }
        }
    }

    #[test]
    fn test_create_lons_lats() {
        let coords = create_lons_lats(3, 4, -6.0, 30.0, 0.5);
        assert_eq!(coords.shape(), &[3, 4, 2]);
        assert_eq!(coords[[0, 3, 0]], -4.5);
        assert_eq!(coords[[2, 0, 1]], 31.0);
    }

    #[test]
    fn test_seasonal_series_period() {
        let series = create_seasonal_series(13, 12.0, 5.0, 2.0);
        assert!((series[0] - 5.0).abs() < 1e-12);
        assert!((series[3] - 7.0).abs() < 1e-12);
        assert!((series[12] - series[0]).abs() < 1e-9);
    }
}
