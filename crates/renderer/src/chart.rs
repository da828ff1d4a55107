//! Small line charts: cluster id against time step, and elbow curves.
//!
//! Charts carry axes and tick marks but no text; the accompanying JSON
//! report holds the numbers.

use crate::gradient::{finite_range, Color};
use crate::style::ClusterPalette;
use crate::{RenderError, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Chart canvas options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,

    /// Blank border around the plot area, in pixels.
    pub margin: u32,

    pub marker_radius: i32,
    pub background: [u8; 4],
    pub foreground: [u8; 4],

    /// Tick the time axis every this many steps, starting at step 0.
    pub x_tick_every: Option<usize>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            margin: 30,
            marker_radius: 3,
            background: [255, 255, 255, 255],
            foreground: [0, 0, 0, 255],
            x_tick_every: None,
        }
    }
}

/// Maps data coordinates into the plot area.
struct Frame {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    fn new(options: &ChartOptions, x_range: (f64, f64), y_range: (f64, f64)) -> Result<Self> {
        let margin = options.margin as f32;
        let (w, h) = (options.width as f32, options.height as f32);
        if w <= 2.0 * margin || h <= 2.0 * margin {
            return Err(RenderError::Empty(format!(
                "{}x{} canvas leaves no room inside a {} px margin",
                options.width, options.height, options.margin
            )));
        }
        Ok(Self {
            left: margin,
            right: w - margin,
            top: margin,
            bottom: h - margin,
            x_range: widen(x_range),
            y_range: widen(y_range),
        })
    }

    fn x(&self, value: f64) -> f32 {
        let t = (value - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        self.left + t as f32 * (self.right - self.left)
    }

    fn y(&self, value: f64) -> f32 {
        let t = (value - self.y_range.0) / (self.y_range.1 - self.y_range.0);
        self.bottom - t as f32 * (self.bottom - self.top)
    }

    fn draw_axes(&self, img: &mut RgbaImage, color: Rgba<u8>) {
        draw_line_segment_mut(img, (self.left, self.bottom), (self.right, self.bottom), color);
        draw_line_segment_mut(img, (self.left, self.top), (self.left, self.bottom), color);
    }

    fn x_tick(&self, img: &mut RgbaImage, value: f64, color: Rgba<u8>) {
        let x = self.x(value);
        draw_line_segment_mut(img, (x, self.bottom), (x, self.bottom + 5.0), color);
    }

    fn y_tick(&self, img: &mut RgbaImage, value: f64, color: Rgba<u8>) {
        let y = self.y(value);
        draw_line_segment_mut(img, (self.left - 5.0, y), (self.left, y), color);
    }
}

/// Give a degenerate range some width.
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn rgba(c: [u8; 4]) -> Rgba<u8> {
    Rgba(c)
}

fn marker(img: &mut RgbaImage, x: f32, y: f32, radius: i32, color: Color) {
    draw_filled_circle_mut(img, (x.round() as i32, y.round() as i32), radius, color.into());
}

/// Plot a label series: one marker per time step coloured by cluster,
/// joined by a line. NaN entries break the line.
pub fn render_label_timeseries(
    labels: &Array1<f64>,
    palette: &ClusterPalette,
    options: &ChartOptions,
) -> Result<RgbaImage> {
    let (_, max_label) = finite_range(labels.iter())
        .ok_or_else(|| RenderError::Empty("label series has no labels".to_string()))?;
    let frame = Frame::new(
        options,
        (0.0, labels.len().saturating_sub(1) as f64),
        (0.0, max_label.max(0.0)),
    )?;

    let mut img = RgbaImage::from_pixel(options.width, options.height, rgba(options.background));
    let fg = rgba(options.foreground);
    frame.draw_axes(&mut img, fg);
    for id in 0..=max_label.max(0.0).round() as usize {
        frame.y_tick(&mut img, id as f64, fg);
    }
    if let Some(every) = options.x_tick_every {
        for t in (0..labels.len()).step_by(every.max(1)) {
            frame.x_tick(&mut img, t as f64, fg);
        }
    }

    let line = rgba([160, 160, 160, 255]);
    for (t, pair) in labels.windows(2).into_iter().enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if a.is_finite() && b.is_finite() {
            draw_line_segment_mut(
                &mut img,
                (frame.x(t as f64), frame.y(a)),
                (frame.x((t + 1) as f64), frame.y(b)),
                line,
            );
        }
    }
    for (t, &label) in labels.iter().enumerate() {
        if label.is_finite() && label >= 0.0 {
            let color = palette.color_for(label.round() as usize);
            marker(&mut img, frame.x(t as f64), frame.y(label), options.marker_radius, color);
        }
    }

    Ok(img)
}

/// Plot inertia against cluster count.
pub fn render_elbow(points: &[(usize, f64)], options: &ChartOptions) -> Result<RgbaImage> {
    let mut points: Vec<(usize, f64)> = points.iter().copied().filter(|(_, v)| v.is_finite()).collect();
    points.sort_by_key(|(k, _)| *k);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(RenderError::Empty("elbow curve has no points".to_string()));
    };
    let (lo, hi) = finite_range(points.iter().map(|(_, v)| v))
        .ok_or_else(|| RenderError::Empty("elbow curve has no points".to_string()))?;
    let frame = Frame::new(options, (first.0 as f64, last.0 as f64), (lo.min(0.0), hi))?;

    let mut img = RgbaImage::from_pixel(options.width, options.height, rgba(options.background));
    let fg = rgba(options.foreground);
    frame.draw_axes(&mut img, fg);

    for pair in points.windows(2) {
        draw_line_segment_mut(
            &mut img,
            (frame.x(pair[0].0 as f64), frame.y(pair[0].1)),
            (frame.x(pair[1].0 as f64), frame.y(pair[1].1)),
            fg,
        );
    }
    let accent = Color::new(0x1f, 0x77, 0xb4, 255);
    for &(k, inertia) in &points {
        marker(&mut img, frame.x(k as f64), frame.y(inertia), options.marker_radius, accent);
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_timeseries_canvas() {
        let labels = array![0.0, 1.0, f64::NAN, 1.0, 0.0];
        let options = ChartOptions { width: 200, height: 100, margin: 10, ..Default::default() };
        let img = render_label_timeseries(&labels, &ClusterPalette::tab10(), &options).unwrap();
        assert_eq!(img.dimensions(), (200, 100));
        // First marker: t = 0 on the x axis.
        assert_eq!(img.get_pixel(10, 90).0, [0x1f, 0x77, 0xb4, 255]);
    }

    #[test]
    fn test_timeseries_date_ticks() {
        let labels = Array1::from_elem(11, 0.0);
        let options = ChartOptions {
            width: 120,
            height: 100,
            margin: 10,
            x_tick_every: Some(5),
            ..Default::default()
        };
        let img = render_label_timeseries(&labels, &ClusterPalette::tab10(), &options).unwrap();
        // Steps 0, 5 and 10 sit at x = 10, 60 and 110; ticks hang below the axis.
        for x in [10, 60, 110] {
            assert_eq!(img.get_pixel(x, 93).0, [0, 0, 0, 255], "tick at x = {}", x);
        }
        assert_eq!(img.get_pixel(35, 93).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_timeseries_without_labels() {
        let labels = Array1::from_elem(4, f64::NAN);
        assert!(matches!(
            render_label_timeseries(&labels, &ClusterPalette::tab10(), &ChartOptions::default()),
            Err(RenderError::Empty(_))
        ));
    }

    #[test]
    fn test_margin_too_large() {
        let options = ChartOptions { width: 40, height: 40, margin: 20, ..Default::default() };
        assert!(render_elbow(&[(1, 10.0), (2, 5.0)], &options).is_err());
    }

    #[test]
    fn test_elbow_single_point() {
        let options = ChartOptions { width: 100, height: 100, margin: 10, ..Default::default() };
        let img = render_elbow(&[(3, 42.0)], &options).unwrap();
        assert_eq!(img.dimensions(), (100, 100));
    }
}
