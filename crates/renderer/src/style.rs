//! Colour styles: categorical palettes for cluster ids and gradients for
//! concentrations.

use crate::gradient::{interpolate_color, Color};
use crate::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn parse_hex(hex: &str) -> Result<Color> {
    hex_to_rgb(hex)
        .map(|(r, g, b)| Color::new(r, g, b, 255))
        .ok_or_else(|| RenderError::Palette(format!("invalid hex colour '{}'", hex)))
}

/// Color stop for gradient
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    /// Position on the normalized `[0, 1]` scale.
    pub value: f32,
    pub color: String,
    pub label: Option<String>,
}

/// Continuous colour ramp for concentration maps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GradientStyle {
    pub name: String,
    pub description: Option<String>,
    pub stops: Vec<ColorStop>,
}

const VIRIDIS: [&str; 9] = [
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];

const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

impl GradientStyle {
    /// The viridis ramp, matplotlib's default colour map.
    pub fn viridis() -> Self {
        let last = (VIRIDIS.len() - 1) as f32;
        Self {
            name: "viridis".to_string(),
            description: None,
            stops: VIRIDIS
                .iter()
                .enumerate()
                .map(|(i, hex)| ColorStop {
                    value: i as f32 / last,
                    color: hex.to_string(),
                    label: None,
                })
                .collect(),
        }
    }

    /// Load a gradient from JSON, e.g.
    /// `{"name": "oxygen", "stops": [{"value": 0.0, "color": "#000080"}, ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let style: Self = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<()> {
        if self.stops.is_empty() {
            return Err(RenderError::Palette(format!("gradient '{}' has no stops", self.name)));
        }
        for stop in &self.stops {
            parse_hex(&stop.color)?;
        }
        Ok(())
    }

    /// Colour at `t` in `[0, 1]`, interpolated between the surrounding stops.
    pub fn color_at(&self, t: f32) -> Color {
        let mut stops: Vec<(f32, Color)> = self
            .stops
            .iter()
            .filter_map(|s| parse_hex(&s.color).ok().map(|c| (s.value, c)))
            .collect();
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));

        let Some(&(first_value, first_color)) = stops.first() else {
            return Color::transparent();
        };
        if t <= first_value {
            return first_color;
        }
        for pair in stops.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if t <= high.0 {
                let span = high.0 - low.0;
                let local = if span > 0.0 { (t - low.0) / span } else { 0.0 };
                return interpolate_color(low.1, high.1, local);
            }
        }
        stops[stops.len() - 1].1
    }
}

impl Default for GradientStyle {
    fn default() -> Self {
        Self::viridis()
    }
}

/// Colours for cluster ids.
#[derive(Debug, Clone)]
pub struct ClusterPalette {
    colors: Vec<Color>,
}

#[derive(Deserialize)]
struct PaletteFile {
    colors: Vec<String>,
}

impl ClusterPalette {
    pub fn from_hex_list<S: AsRef<str>>(hexes: &[S]) -> Result<Self> {
        if hexes.is_empty() {
            return Err(RenderError::Palette("palette has no colours".to_string()));
        }
        let colors = hexes
            .iter()
            .map(|h| parse_hex(h.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { colors })
    }

    /// Load `{"colors": ["#rrggbb", ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PaletteFile = serde_json::from_str(json)?;
        Self::from_hex_list(&file.colors)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// matplotlib's ten categorical colours.
    pub fn tab10() -> Self {
        Self {
            colors: TAB10.iter().filter_map(|h| parse_hex(h).ok()).collect(),
        }
    }

    /// `n` colours evenly spaced along viridis, so ids read as an ordered
    /// scale the way a contour plot of labels does.
    pub fn viridis(n: usize) -> Self {
        let ramp = GradientStyle::viridis();
        let n = n.max(1);
        let colors = (0..n)
            .map(|i| {
                let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
                ramp.color_at(t)
            })
            .collect();
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour of a cluster id; ids past the end wrap around.
    pub fn color_for(&self, label: usize) -> Color {
        self.colors[label % self.colors.len()]
    }
}

impl Default for ClusterPalette {
    fn default() -> Self {
        Self::tab10()
    }
}
