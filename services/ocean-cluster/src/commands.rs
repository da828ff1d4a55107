//! One function per subcommand.

use crate::config::OceanClusterConfig;
use crate::output::{FieldMapInfo, OutputWriter};
use analysis::{single_chemical_clustering, timestep_clustering, timewise_clustering, ClusteringReport};
use anyhow::{bail, Context, Result};
use cluster_engine::{elbow_sweep, ElbowPoint};
use field_processor::{
    average_data, load_field, load_field_with_chemicals, load_lons_lats, location_features,
    save_field, spatial_features, spatial_mean_features, timestep_features, OceanField, MATRIX_KEY,
};
use ndarray::{Axis, Dimension};
use ocean_common::{Chemical, ChemicalSelection, LonLatGrid, Timeline};
use renderer::gradient::finite_range;
use renderer::{render_elbow, ChartOptions};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

fn load_data(config: &OceanClusterConfig) -> Result<OceanField> {
    let data = &config.data;
    let field = match &data.chemicals {
        Some(chemicals) => load_field_with_chemicals(&data.data_path, &data.matrix_key, chemicals.clone()),
        None => load_field(&data.data_path, &data.matrix_key),
    };
    field.with_context(|| format!("Failed to load field from {}", data.data_path.display()))
}

fn load_grid(config: &OceanClusterConfig) -> Result<LonLatGrid> {
    let data = &config.data;
    load_lons_lats(&data.lons_lats_path, &data.lons_lats_key)
        .with_context(|| format!("Failed to load coordinates from {}", data.lons_lats_path.display()))
}

/// The dates file is optional; a missing or unreadable one is logged and
/// skipped.
fn load_dates(config: &OceanClusterConfig) -> Option<Timeline> {
    let path = config.data.dates_path.as_ref()?;
    if !path.exists() {
        return None;
    }
    match Timeline::from_file(path) {
        Ok(timeline) => Some(timeline),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring dates file");
            None
        }
    }
}

fn finish<D: Dimension>(config: &OceanClusterConfig, report: ClusteringReport<D>) -> ClusteringReport<D> {
    if config.clustering.sort_by_size && report.n_clusters().is_some() {
        report.sorted_by_size()
    } else {
        report
    }
}

/// Average the field over windows of `delta_t` steps and save it.
///
/// The averaged dates are written next to the archive when a dates file
/// is configured.
pub fn average(
    config: &OceanClusterConfig,
    delta_t: usize,
    selection: &ChemicalSelection,
    out: Option<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let field = load_data(config)?;
    let averaged = average_data(&field, selection, delta_t)?;

    fs::create_dir_all(&config.output.dir)?;
    let path = out.unwrap_or_else(|| config.output.dir.join(format!("av_model_data{}.npz", delta_t)));
    save_field(&path, MATRIX_KEY, &averaged)?;
    let mut written = vec![path];

    if let Some(dates) = load_dates(config) {
        let starts = dates.window_starts(delta_t);
        let dates_path = config.output.dir.join(format!("av_datetimes{}.txt", delta_t));
        fs::write(&dates_path, starts.labels().join("\n") + "\n")?;
        written.push(dates_path);
    }

    if averaged.chemicals() != &Chemical::ALL[..averaged.n_chemicals()] {
        info!(
            chemicals = ?averaged.chemicals(),
            "Averaged field holds a channel subset; set data.chemicals when loading it"
        );
    }
    Ok(written)
}

/// Cluster cells by the history of one chemical.
pub fn spatial(config: &OceanClusterConfig, chemical: Chemical) -> Result<Vec<PathBuf>> {
    let field = load_data(config)?;
    let grid = load_grid(config)?;
    let writer = OutputWriter::new(&config.output)?;

    let report = single_chemical_clustering(&field, chemical, &config.clustering.to_params())?;
    let report = finish(config, report);
    writer.write_spatial(&format!("spatial_{}", chemical.short_name().to_lowercase()), &report, &grid)
}

/// Cluster cells by their chemical make-up at one time step.
pub fn timestep(config: &OceanClusterConfig, index: usize) -> Result<Vec<PathBuf>> {
    let field = load_data(config)?;
    let grid = load_grid(config)?;
    let writer = OutputWriter::new(&config.output)?;

    let report = timestep_clustering(&field, index, &config.clustering.to_params())?;
    let report = finish(config, report);
    writer.write_spatial(&format!("timestep_{}", index), &report, &grid)
}

/// Cluster time steps at one cell, or over the basin mean.
pub fn timewise(
    config: &OceanClusterConfig,
    location: Option<(usize, usize)>,
    selection: &ChemicalSelection,
) -> Result<Vec<PathBuf>> {
    let field = load_data(config)?;
    let writer = OutputWriter::new(&config.output)?;

    let report = timewise_clustering(&field, location, selection, &config.clustering.to_params())?;
    let report = finish(config, report);
    let name = match location {
        Some((lat, lon)) => format!("timewise_{}_{}", lat, lon),
        None => "timewise_mean".to_string(),
    };
    let dates = load_dates(config).filter(|d| d.len() == field.n_times());
    writer.write_temporal(&name, &report, dates.as_ref())
}

/// Concentration map of one chemical at one time step.
///
/// `range` pins the ends of the colour ramp; by default the finite extent
/// of the layer is used.
pub fn map(
    config: &OceanClusterConfig,
    timestep: usize,
    chemical: Chemical,
    range: Option<(f64, f64)>,
) -> Result<Vec<PathBuf>> {
    let field = load_data(config)?;
    let grid = load_grid(config)?;
    let writer = OutputWriter::new(&config.output)?;

    field.timestep(timestep)?;
    let layer = field.series_of(chemical)?.index_axis(Axis(0), timestep).to_owned();
    let range = match range {
        Some((lo, hi)) if lo < hi => (lo, hi),
        Some((lo, hi)) => bail!("empty colour range {}..{}", lo, hi),
        None => finite_range(layer.iter())
            .with_context(|| format!("{} has no ocean cells at time step {}", chemical, timestep))?,
    };

    let info = FieldMapInfo {
        chemical: chemical.short_name().to_string(),
        timestep,
        date: load_dates(config)
            .filter(|d| d.len() == field.n_times())
            .and_then(|d| d.get(timestep))
            .map(|t| t.format("%Y-%m-%d").to_string()),
        range,
        finite_cells: layer.iter().filter(|v| v.is_finite()).count(),
    };
    let name = format!("map_{}_{}", chemical.short_name().to_lowercase(), timestep);
    writer.write_field_map(&name, &layer, &grid, &info)
}

/// What the elbow sweep clusters.
#[derive(Debug, Clone)]
pub enum ElbowTarget {
    /// Cells by the history of one chemical.
    Chemical(Chemical),
    /// Cells by their chemical make-up at one time step.
    Timestep(usize),
    /// Time steps at one cell, or over the basin mean when `location` is
    /// `None`.
    Timewise {
        location: Option<(usize, usize)>,
        selection: ChemicalSelection,
    },
}

impl ElbowTarget {
    fn name(&self) -> String {
        match self {
            ElbowTarget::Chemical(chemical) => format!("elbow_{}", chemical.short_name().to_lowercase()),
            ElbowTarget::Timestep(t) => format!("elbow_timestep_{}", t),
            ElbowTarget::Timewise { location: Some((lat, lon)), .. } => {
                format!("elbow_timewise_{}_{}", lat, lon)
            }
            ElbowTarget::Timewise { location: None, .. } => "elbow_timewise_mean".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ElbowJson<'a> {
    target: String,
    samples: usize,
    points: &'a [ElbowPoint],
}

/// K-means inertia for every k in `k_min..=k_max`.
pub fn elbow(
    config: &OceanClusterConfig,
    target: ElbowTarget,
    k_min: usize,
    k_max: usize,
) -> Result<Vec<PathBuf>> {
    if k_min == 0 || k_max < k_min {
        bail!("invalid k range {}..={}", k_min, k_max);
    }
    let field = load_data(config)?;
    let writer = OutputWriter::new(&config.output)?;

    let name = target.name();
    let features = match &target {
        ElbowTarget::Chemical(chemical) => spatial_features(field.series_of(*chemical)?)?,
        ElbowTarget::Timestep(t) => timestep_features(field.timestep(*t)?)?,
        ElbowTarget::Timewise {
            location: Some((lat, lon)),
            selection,
        } => location_features(&field, *lat, *lon, selection)?,
        ElbowTarget::Timewise { location: None, selection } => spatial_mean_features(&field, selection)?,
    };
    let n_samples = features.n_samples();
    let k_max = k_max.min(n_samples);
    if k_max < k_min {
        bail!("only {} samples, fewer than k_min = {}", n_samples, k_min);
    }

    let ks: Vec<usize> = (k_min..=k_max).collect();
    let points = elbow_sweep(features.records.view(), &ks, &config.clustering.to_params())?;

    let mut written = vec![writer.write_json(
        &name,
        &ElbowJson {
            target: name.clone(),
            samples: n_samples,
            points: &points,
        },
    )?];
    let pairs: Vec<(usize, f64)> = points.iter().map(|p| (p.k, p.inertia)).collect();
    let image = render_elbow(&pairs, &ChartOptions::default())?;
    written.extend(writer.write_png(&name, &image)?);
    Ok(written)
}
