//! Images of clustering results.
//!
//! - Label and concentration maps on the model grid ([`geographic`])
//! - Label series and elbow charts ([`chart`])
//! - Cluster palettes and colour ramps ([`style`])
//! - PNG encoding, palette images for label maps ([`png`])

pub mod chart;
pub mod error;
pub mod geographic;
pub mod gradient;
pub mod png;
pub mod style;

pub use chart::{render_elbow, render_label_timeseries, ChartOptions};
pub use error::{RenderError, Result};
pub use geographic::{render_field_map, render_label_map, MapOptions};
pub use gradient::Color;
pub use image::RgbaImage;
pub use png::{save_png, EncodePng, IndexedImage};
pub use style::{hex_to_rgb, ClusterPalette, ColorStop, GradientStyle};
