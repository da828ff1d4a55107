//! Label and concentration maps on the model's lon/lat grid.
//!
//! One grid cell becomes a `scale` × `scale` block of pixels. The image is
//! oriented north-up and west-left whatever order the rows and columns
//! of the grid are stored in. Land (NaN) stays transparent.
//!
//! Label maps come out as [`IndexedImage`]s: slot 0 is the background and
//! cluster `c` takes slot `1 + c`.

use crate::gradient::{finite_range, normalize, paint_cells, render_grid, Color};
use crate::png::{IndexedImage, MAX_PALETTE_SIZE};
use crate::style::{ClusterPalette, GradientStyle};
use crate::{RenderError, Result};
use image::RgbaImage;
use ndarray::Array2;
use ocean_common::LonLatGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Map raster options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Pixels per grid cell along each axis.
    pub scale: u32,

    /// RGBA fill for cells without a value.
    pub background: [u8; 4],
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            scale: 8,
            background: [0, 0, 0, 0],
        }
    }
}

impl MapOptions {
    fn background_color(&self) -> Color {
        let [r, g, b, a] = self.background;
        Color::new(r, g, b, a)
    }
}

fn lon_decreases_with_col(grid: &LonLatGrid) -> bool {
    let lons = grid.lons();
    let n_lon = grid.n_lon();
    if n_lon < 2 {
        return false;
    }
    let col_mean = |j: usize| {
        let finite: Vec<f64> = lons.column(j).iter().copied().filter(|v| v.is_finite()).collect();
        (!finite.is_empty()).then(|| finite.iter().sum::<f64>() / finite.len() as f64)
    };
    match (col_mean(0), col_mean(n_lon - 1)) {
        (Some(first), Some(last)) => last < first,
        _ => false,
    }
}

/// Check `values` against the grid and work out which axes to flip.
fn orient(values: &Array2<f64>, grid: &LonLatGrid, options: &MapOptions) -> Result<(bool, bool)> {
    grid.check_layer_shape(values)?;
    if values.is_empty() {
        return Err(RenderError::Empty("map has no cells".to_string()));
    }
    let flip_rows = grid.lat_increases_with_row();
    let flip_cols = lon_decreases_with_col(grid);
    debug!(
        rows = values.nrows(),
        cols = values.ncols(),
        scale = options.scale,
        flip_rows,
        flip_cols,
        "Rendering map"
    );
    Ok((flip_rows, flip_cols))
}

/// Draw a lat × lon grid of cluster labels.
///
/// Labels are floats as produced by the analyses; NaN cells are left as
/// background and negative labels are treated the same way. Up to 255
/// palette colours are used; ids past that wrap around.
pub fn render_label_map(
    labels: &Array2<f64>,
    grid: &LonLatGrid,
    palette: &ClusterPalette,
    options: &MapOptions,
) -> Result<IndexedImage> {
    if palette.is_empty() {
        return Err(RenderError::Palette("cluster palette has no colours".to_string()));
    }
    let (flip_rows, flip_cols) = orient(labels, grid, options)?;
    let slots = palette.len().min(MAX_PALETTE_SIZE - 1);

    let mut colors = Vec::with_capacity(slots + 1);
    colors.push(options.background_color());
    colors.extend((0..slots).map(|id| palette.color_for(id)));

    let (width, height, indices) = paint_cells(labels.view(), options.scale, flip_rows, flip_cols, 0u8, |v| {
        (v.is_finite() && v >= 0.0).then(|| (1 + v.round() as usize % slots) as u8)
    });
    IndexedImage::new(width, height, colors, indices)
}

/// Draw a lat × lon grid of values on a colour ramp.
///
/// `range` fixes the ends of the ramp; by default the finite extent of
/// `values` is used.
pub fn render_field_map(
    values: &Array2<f64>,
    grid: &LonLatGrid,
    range: Option<(f64, f64)>,
    style: &GradientStyle,
    options: &MapOptions,
) -> Result<RgbaImage> {
    let (min, max) = match range {
        Some(range) => range,
        None => finite_range(values.iter())
            .ok_or_else(|| RenderError::Empty("field has no finite values".to_string()))?,
    };
    let (flip_rows, flip_cols) = orient(values, grid, options)?;
    Ok(render_grid(
        values.view(),
        options.scale,
        flip_rows,
        flip_cols,
        options.background_color(),
        |v| v.is_finite().then(|| style.color_at(normalize(v, min, max))),
    ))
}
