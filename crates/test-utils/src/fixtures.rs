//! Common test fixtures for ocean-cluster tests.
//!
//! [`TempDataset`] writes a complete synthetic dataset (model matrix,
//! coordinates, dates) to a temporary directory in the same file formats the
//! real pipeline reads.

use crate::generators::{apply_land_mask, create_land_mask, create_lons_lats, create_two_region_field};
use chrono::{Duration, NaiveDate};
use ndarray::{Array3, Array4};
use ndarray_npy::NpzWriter;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Common dates for testing.
pub mod dates {
    /// First day of the synthetic model run.
    pub const START: &str = "2015-01-01";

    /// A short dates file with a comment and a blank line.
    pub const SAMPLE_FILE: &str = "# model dates\n2015-01-01\n2015-01-02\n\n2015-01-03T12:00:00\n";
}

/// Common grid extents for testing, as `(min_lon, min_lat, step)`.
pub mod grid {
    /// A patch of the western Mediterranean at 1/4 degree.
    pub const WEST_MED: (f64, f64, f64) = (-5.5, 35.0, 0.25);

    /// Unit grid starting at the origin.
    pub const UNIT: (f64, f64, f64) = (0.0, 0.0, 1.0);
}

/// Archive key of the model matrix.
pub const MATRIX_KEY: &str = "matrix";

/// Archive key of the coordinate array.
pub const LONS_LATS_KEY: &str = "lons_lats";

/// One ISO date per line, `n` consecutive days from `start`.
pub fn daily_dates_text(start: &str, n: usize) -> String {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").expect("valid start date");
    (0..n)
        .map(|d| format!("{}\n", start + Duration::days(d as i64)))
        .collect()
}

/// Writes `array` under `key` in a compressed `.npz` archive.
pub fn write_npz<D: ndarray::Dimension>(path: &Path, key: &str, array: &ndarray::Array<f64, D>) {
    let file = File::create(path).expect("create npz");
    let mut npz = NpzWriter::new_compressed(file);
    npz.add_array(key, array).expect("write npz entry");
    npz.finish().expect("finish npz");
}

/// A synthetic dataset on disk.
///
/// The field is [`create_two_region_field`] with the first column masked
/// as land. Files are removed when the value is dropped.
pub struct TempDataset {
    pub dir: TempDir,
    pub data_path: PathBuf,
    pub lons_lats_path: PathBuf,
    pub dates_path: PathBuf,
    pub field: Array4<f64>,
    pub lons_lats: Array3<f64>,
}

impl TempDataset {
    pub fn create(n_times: usize, n_lat: usize, n_lon: usize) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("ocean_dataset_")
            .tempdir()
            .expect("Failed to create temporary test directory");

        let mut field = create_two_region_field(n_times, n_lat, n_lon, 42);
        apply_land_mask(&mut field, &create_land_mask(n_lat, n_lon, 1));
        let (min_lon, min_lat, step) = grid::WEST_MED;
        let lons_lats = create_lons_lats(n_lat, n_lon, min_lon, min_lat, step);

        let data_path = dir.path().join("model_data.npz");
        let lons_lats_path = dir.path().join("lons_lats.npz");
        let dates_path = dir.path().join("datetimes.txt");
        write_npz(&data_path, MATRIX_KEY, &field);
        write_npz(&lons_lats_path, LONS_LATS_KEY, &lons_lats);
        std::fs::write(&dates_path, daily_dates_text(dates::START, n_times)).expect("write dates");

        Self {
            dir,
            data_path,
            lons_lats_path,
            dates_path,
            field,
            lons_lats,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_dates_text() {
        let text = daily_dates_text("2015-12-30", 3);
        assert_eq!(text, "2015-12-30\n2015-12-31\n2016-01-01\n");
    }

    #[test]
    fn test_temp_dataset_files_exist() {
        let dataset = TempDataset::create(4, 4, 3);
        assert!(dataset.data_path.exists());
        assert!(dataset.lons_lats_path.exists());
        assert!(dataset.dates_path.exists());
        assert!(dataset.field[[0, 0, 0, 0]].is_nan());
        assert!(!dataset.field[[0, 0, 1, 0]].is_nan());
    }

    #[test]
    fn test_temp_dataset_removed_on_drop() {
        let dataset = TempDataset::create(2, 2, 2);
        let dir = dataset.path().to_path_buf();
        drop(dataset);
        assert!(!dir.exists());
    }
}
