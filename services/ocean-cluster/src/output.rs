//! Writing analysis results: label arrays, JSON reports and PNG images.

use crate::config::OutputConfig;
use analysis::{ReportSummary, SpatialReport, TemporalReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use field_processor::save_array_npy;
use ocean_common::{BoundingBox, LonLatGrid, Timeline};
use ndarray::Array2;
use renderer::{
    render_field_map, render_label_map, render_label_timeseries, save_png, ChartOptions, ClusterPalette,
    EncodePng, GradientStyle, MapOptions,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JSON written next to a spatial label grid.
#[derive(Debug, Serialize)]
struct SpatialJson<'a> {
    analysis: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    summary: ReportSummary<'a>,
    grid_shape: (usize, usize),
    bbox: Option<BoundingBox>,
}

/// JSON written next to a label series.
#[derive(Debug, Serialize)]
struct TemporalJson<'a> {
    analysis: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    summary: ReportSummary<'a>,
    dates: Option<Vec<String>>,
    date_ticks: Option<Vec<DateTick>>,
}

/// A ticked step on the time axis of a chart.
#[derive(Debug, Serialize)]
struct DateTick {
    index: usize,
    date: String,
}

/// JSON written next to a concentration map.
#[derive(Debug, Serialize)]
pub struct FieldMapInfo {
    pub chemical: String,
    pub timestep: usize,
    pub date: Option<String>,
    /// Values at the low and high end of the colour ramp.
    pub range: (f64, f64),
    pub finite_cells: usize,
}

#[derive(Debug, Serialize)]
struct FieldMapJson<'a> {
    analysis: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    info: &'a FieldMapInfo,
    grid_shape: (usize, usize),
    bbox: Option<BoundingBox>,
}

/// Writes every artefact of a run into one directory.
pub struct OutputWriter {
    dir: PathBuf,
    png: bool,
    map_options: MapOptions,
    palette: Option<ClusterPalette>,
    gradient: GradientStyle,
    date_tick_every: usize,
}

impl OutputWriter {
    pub fn new(config: &OutputConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)
            .with_context(|| format!("Failed to create output directory: {}", config.dir.display()))?;
        let palette = match &config.palette {
            Some(path) => Some(
                ClusterPalette::from_file(path)
                    .with_context(|| format!("Failed to load palette: {}", path.display()))?,
            ),
            None => None,
        };
        let gradient = match &config.gradient {
            Some(path) => GradientStyle::from_file(path)
                .with_context(|| format!("Failed to load colour ramp: {}", path.display()))?,
            None => GradientStyle::viridis(),
        };
        Ok(Self {
            dir: config.dir.clone(),
            png: config.png,
            map_options: MapOptions {
                scale: config.map_scale,
                ..MapOptions::default()
            },
            palette,
            gradient,
            date_tick_every: config.date_tick_every,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn palette_for(&self, n_clusters: Option<usize>) -> ClusterPalette {
        self.palette
            .clone()
            .unwrap_or_else(|| ClusterPalette::viridis(n_clusters.unwrap_or(1)))
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.json", name));
        let text = serde_json::to_string_pretty(value)?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Wrote report");
        Ok(path)
    }

    /// Save an image unless PNG output is disabled.
    pub fn write_png(&self, name: &str, image: &impl EncodePng) -> Result<Option<PathBuf>> {
        if !self.png {
            return Ok(None);
        }
        let path = self.dir.join(format!("{}.png", name));
        save_png(&path, image).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Wrote image");
        Ok(Some(path))
    }

    /// `<name>.npy` labels, `<name>.json` summary and `<name>.png` map.
    pub fn write_spatial(
        &self,
        name: &str,
        report: &SpatialReport,
        grid: &LonLatGrid,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let npy = self.dir.join(format!("{}.npy", name));
        save_array_npy(&npy, &report.labels)?;
        written.push(npy);

        written.push(self.write_json(
            name,
            &SpatialJson {
                analysis: name,
                generated_at: Utc::now(),
                summary: report.summary(),
                grid_shape: report.labels.dim(),
                bbox: grid.bbox(),
            },
        )?);

        if report.n_clusters().is_some() {
            let palette = self.palette_for(report.n_clusters());
            let image = render_label_map(&report.labels, grid, &palette, &self.map_options)?;
            written.extend(self.write_png(name, &image)?);
        }

        info!(name = %name, files = written.len(), "Saved spatial clustering");
        Ok(written)
    }

    /// `<name>.npy` labels, `<name>.json` summary and `<name>.png` chart.
    ///
    /// `dates` is included in the report when it matches the series length.
    pub fn write_temporal(
        &self,
        name: &str,
        report: &TemporalReport,
        dates: Option<&Timeline>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let npy = self.dir.join(format!("{}.npy", name));
        save_array_npy(&npy, &report.labels)?;
        written.push(npy);

        let dates = dates.filter(|d| d.len() == report.labels.len());
        let date_ticks = dates.map(|d| {
            d.every_nth(self.date_tick_every)
                .labels()
                .into_iter()
                .enumerate()
                .map(|(i, date)| DateTick {
                    index: i * self.date_tick_every,
                    date,
                })
                .collect()
        });
        written.push(self.write_json(
            name,
            &TemporalJson {
                analysis: name,
                generated_at: Utc::now(),
                summary: report.summary(),
                dates: dates.map(Timeline::labels),
                date_ticks,
            },
        )?);

        if report.n_clusters().is_some() && report.labels.iter().any(|v| v.is_finite()) {
            let palette = self.palette_for(report.n_clusters());
            let options = ChartOptions {
                x_tick_every: date_ticks_wanted(dates).then_some(self.date_tick_every),
                ..ChartOptions::default()
            };
            let image = render_label_timeseries(&report.labels, &palette, &options)?;
            written.extend(self.write_png(name, &image)?);
        }

        info!(name = %name, files = written.len(), "Saved temporal clustering");
        Ok(written)
    }

    /// `<name>.json` summary and `<name>.png` concentration map of one
    /// lat × lon layer.
    pub fn write_field_map(
        &self,
        name: &str,
        values: &Array2<f64>,
        grid: &LonLatGrid,
        info: &FieldMapInfo,
    ) -> Result<Vec<PathBuf>> {
        let mut written = vec![self.write_json(
            name,
            &FieldMapJson {
                analysis: name,
                generated_at: Utc::now(),
                info,
                grid_shape: values.dim(),
                bbox: grid.bbox(),
            },
        )?];

        let image = render_field_map(values, grid, Some(info.range), &self.gradient, &self.map_options)?;
        written.extend(self.write_png(name, &image)?);

        info!(name = %name, files = written.len(), "Saved concentration map");
        Ok(written)
    }
}

fn date_ticks_wanted(dates: Option<&Timeline>) -> bool {
    dates.is_some_and(|d| !d.is_empty())
}
