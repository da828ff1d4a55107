//! Field processing for 4-D ocean concentration arrays.
//!
//! The model output is a `(time, lat, lon, chemical)` array with NaN where
//! a cell has no data (land, or gaps in the run). This crate turns it into
//! the flat sample matrices a clustering backend expects and maps labels
//! back onto the grid afterwards:
//!
//! ```text
//! .npz on disk
//!      │
//!      ▼
//! load_field() ──► OceanField
//!      │
//!      ├─► average_data(delta_t)          (optional, cached as .npz)
//!      │
//!      ├─► spatial_features / timestep_features / location_features / ...
//!      │         │
//!      │         ▼
//!      │    FeatureMatrix { records, origins }
//!      │         │
//!      │         ▼
//!      │    clustering backend ──► per-sample labels
//!      │
//!      └─► scatter_labels(labels, origins) ──► lat × lon grid (NaN = unlabelled)
//! ```

pub mod average;
pub mod error;
pub mod features;
pub mod field;
pub mod io;
pub mod labels;

pub use average::average_data;
pub use error::{FieldError, Result};
pub use features::{
    location_features, spatial_features, spatial_mean_features, timestep_features, FeatureMatrix,
    SampleOrigin,
};
pub use field::OceanField;
pub use io::{
    load_field, load_field_with_chemicals, load_lons_lats, save_array_npy, save_field,
    LONS_LATS_KEY, MATRIX_KEY,
};
pub use labels::{cluster_sizes, label_series, rank_labels, scatter_labels, sort_clusters};
