//! Colours and per-cell rasterisation of value grids.

use image::{Rgba, RgbaImage};
use ndarray::ArrayView2;
use rayon::prelude::*;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Position of `value` within `[min, max]`, clamped to `[0, 1]`.
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return 0.5;
    }
    ((value - min) / range).clamp(0.0, 1.0) as f32
}

/// Finite minimum and maximum of `values`.
pub fn finite_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Lay each cell of `data` out as a `scale` × `scale` block of pixels.
///
/// Returns width, height and the row-major pixels. `cell_fn` returns
/// `None` for cells that stay `background`. Row and column flips move whole
/// cells. Bands of one grid row are filled in parallel.
pub fn paint_cells<P, F>(
    data: ArrayView2<'_, f64>,
    scale: u32,
    flip_rows: bool,
    flip_cols: bool,
    background: P,
    cell_fn: F,
) -> (u32, u32, Vec<P>)
where
    P: Copy + Send + Sync,
    F: Fn(f64) -> Option<P> + Sync,
{
    let (rows, cols) = data.dim();
    let scale = scale.max(1) as usize;
    let width = cols * scale;
    let mut pixels = vec![background; rows * scale * width];

    if width > 0 {
        pixels
            .par_chunks_mut(width * scale)
            .enumerate()
            .for_each(|(out_row, band)| {
                let i = if flip_rows { rows - 1 - out_row } else { out_row };
                for out_col in 0..cols {
                    let j = if flip_cols { cols - 1 - out_col } else { out_col };
                    if let Some(pixel) = cell_fn(data[[i, j]]) {
                        let span = out_col * scale..(out_col + 1) * scale;
                        for line in band.chunks_mut(width) {
                            line[span.clone()].fill(pixel);
                        }
                    }
                }
            });
    }

    (width as u32, (rows * scale) as u32, pixels)
}

/// [`paint_cells`] straight to an RGBA image.
pub fn render_grid<F>(
    data: ArrayView2<'_, f64>,
    scale: u32,
    flip_rows: bool,
    flip_cols: bool,
    background: Color,
    color_fn: F,
) -> RgbaImage
where
    F: Fn(f64) -> Option<Color> + Sync,
{
    let (width, height, pixels) = paint_cells(data, scale, flip_rows, flip_cols, background, color_fn);
    RgbaImage::from_fn(width, height, |x, y| {
        pixels[y as usize * width as usize + x as usize].into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_interpolate_color_midpoint() {
        let mid = interpolate_color(Color::BLACK, Color::WHITE, 0.5);
        assert_eq!(mid, Color::new(128, 128, 128, 255));
    }

    #[test]
    fn test_normalize_flat_range() {
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.5);
        assert_eq!(normalize(5.0, 0.0, 4.0), 1.0);
    }

    #[test]
    fn test_finite_range_skips_nan() {
        let values = [f64::NAN, 2.0, -1.0, f64::INFINITY];
        assert_eq!(finite_range(values.iter()), Some((-1.0, 2.0)));
        assert_eq!(finite_range([f64::NAN].iter()), None);
    }

    #[test]
    fn test_render_grid_flips_rows() {
        let data = array![[1.0, f64::NAN], [2.0, 3.0]];
        let img = render_grid(data.view(), 2, true, false, Color::transparent(), |v| {
            v.is_finite().then(|| Color::new(v as u8, 0, 0, 255))
        });
        assert_eq!(img.dimensions(), (4, 4));
        // Row 0 of the data is drawn at the bottom.
        assert_eq!(img.get_pixel(0, 3).0, [1, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [2, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 3).0[3], 0);
    }

    #[test]
    fn test_paint_cells_flips_columns() {
        let data = array![[1.0, 2.0, f64::NAN]];
        let (w, h, cells) = paint_cells(data.view(), 1, false, true, 0u8, |v| {
            v.is_finite().then(|| v as u8)
        });
        assert_eq!((w, h), (3, 1));
        assert_eq!(cells, vec![0, 2, 1]);
    }
}
