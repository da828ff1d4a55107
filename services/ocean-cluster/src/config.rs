//! Configuration for the ocean-cluster tool.
//!
//! Settings come from, in increasing priority:
//! 1. built-in defaults
//! 2. a YAML file (`--config`), with `${VAR}` and `${VAR:-default}`
//!    substitution
//! 3. `OCEAN_*` environment variables (a `.env` file is read at start-up)
//! 4. command line flags

use anyhow::{bail, Context, Result};
use cluster_engine::{ClusterMode, ClusterParams, DbscanMetric, Linkage};
use ocean_common::Chemical;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanClusterConfig {
    pub data: DataConfig,
    pub clustering: ClusteringConfig,
    pub output: OutputConfig,
}

/// Input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Model matrix, `.npz` or `.npy`.
    pub data_path: PathBuf,
    pub matrix_key: String,

    pub lons_lats_path: PathBuf,
    pub lons_lats_key: String,

    /// One date per line, matching the time axis of `data_path`.
    pub dates_path: Option<PathBuf>,

    /// Channels held by `data_path`, when it is not the full
    /// CHL, DOXY, NITR, PHOS stack (e.g. an average over a subset).
    pub chemicals: Option<Vec<Chemical>>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("av_model_data30.npz"),
            matrix_key: "matrix".to_string(),
            lons_lats_path: PathBuf::from("lons_lats.npz"),
            lons_lats_key: "lons_lats".to_string(),
            dates_path: Some(PathBuf::from("datetimes.txt")),
            chemicals: None,
        }
    }
}

/// Clustering settings as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub mode: ClusterMode,
    pub n_clusters: Option<usize>,
    pub eps: f64,
    pub min_points: usize,
    pub metric: DbscanMetric,
    pub linkage: Linkage,
    pub distance_threshold: Option<f64>,
    pub max_iterations: u64,
    pub n_runs: usize,
    pub seed: u64,

    /// Renumber clusters by size, smallest first.
    pub sort_by_size: bool,

    pub verbose: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            mode: ClusterMode::KMeans,
            n_clusters: Some(5),
            eps: 4.0,
            min_points: 5,
            metric: DbscanMetric::Euclidean,
            linkage: Linkage::Ward,
            distance_threshold: None,
            max_iterations: 300,
            n_runs: 10,
            seed: 42,
            sort_by_size: false,
            verbose: false,
        }
    }
}

impl ClusteringConfig {
    pub fn to_params(&self) -> ClusterParams {
        ClusterParams {
            mode: self.mode,
            n_clusters: self.n_clusters,
            dbscan_eps: self.eps,
            dbscan_min_points: self.min_points,
            metric: self.metric,
            linkage: self.linkage,
            distance_threshold: self.distance_threshold,
            max_iterations: self.max_iterations,
            n_runs: self.n_runs,
            seed: self.seed,
            verbose: self.verbose,
            ..ClusterParams::default()
        }
    }
}

/// Where and how results are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,

    /// Write PNG maps and charts next to the arrays.
    pub png: bool,

    /// Pixels per grid cell in label maps.
    pub map_scale: u32,

    /// JSON file with `{"colors": ["#rrggbb", ...]}`; viridis otherwise.
    pub palette: Option<PathBuf>,

    /// Colour ramp JSON for concentration maps; viridis otherwise.
    pub gradient: Option<PathBuf>,

    /// Spacing, in time steps, of the dated ticks on temporal outputs.
    pub date_tick_every: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            png: true,
            map_scale: 8,
            palette: None,
            gradient: None,
            date_tick_every: 366,
        }
    }
}

impl OceanClusterConfig {
    /// Defaults, overlaid with `path` when given, then with the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content, |name| std::env::var(name).ok())?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Apply `OCEAN_DATA_PATH`, `OCEAN_LONS_LATS_PATH`, `OCEAN_DATES_PATH`
    /// and `OCEAN_OUTPUT_DIR`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        if let Some(path) = get("OCEAN_DATA_PATH") {
            self.data.data_path = path;
        }
        if let Some(path) = get("OCEAN_LONS_LATS_PATH") {
            self.data.lons_lats_path = path;
        }
        if let Some(path) = get("OCEAN_DATES_PATH") {
            self.data.dates_path = Some(path);
        }
        if let Some(path) = get("OCEAN_OUTPUT_DIR") {
            self.output.dir = path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.data_path.as_os_str().is_empty() {
            bail!("data.data_path must be set");
        }
        if self.output.map_scale == 0 {
            bail!("output.map_scale must be > 0");
        }
        if self.output.date_tick_every == 0 {
            bail!("output.date_tick_every must be > 0");
        }
        if let Some(chemicals) = &self.data.chemicals {
            if chemicals.is_empty() {
                bail!("data.chemicals must list at least one chemical when set");
            }
        }
        self.clustering
            .to_params()
            .validate()
            .context("Invalid clustering settings")?;
        Ok(())
    }
}

/// Expand `${VAR}` and `${VAR:-default}` in YAML text.
fn expand_env_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => expr.push(c),
                    None => bail!("Unclosed variable substitution: ${{{}", expr),
                }
            }
            result.push_str(&resolve_var_expr(&expr, &lookup)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr<F>(expr: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match expr.split_once(":-") {
        Some((name, default)) => Ok(lookup(name.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())),
        None => lookup(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_expand_env_vars_simple() {
        let out = expand_env_vars("dir: ${OUT}/maps", env(&[("OUT", "/tmp/run")])).unwrap();
        assert_eq!(out, "dir: /tmp/run/maps");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        let out = expand_env_vars("dir: ${OUT:-output}", env(&[])).unwrap();
        assert_eq!(out, "dir: output");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        assert!(expand_env_vars("dir: ${OUT}", env(&[])).is_err());
        assert!(expand_env_vars("dir: ${OUT", env(&[("OUT", "x")])).is_err());
    }

    #[test]
    fn test_defaults_match_analysis_scripts() {
        let config = OceanClusterConfig::default();
        assert_eq!(config.data.data_path, PathBuf::from("av_model_data30.npz"));
        assert_eq!(config.clustering.n_clusters, Some(5));
        assert_eq!(config.clustering.eps, 4.0);
        assert_eq!(config.output.date_tick_every, 366);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_tick_spacing() {
        let config = OceanClusterConfig::from_yaml_str("output:\n  date_tick_every: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = OceanClusterConfig::from_yaml_str(
            "clustering:\n  mode: dbscan\n  eps: 2.5\ndata:\n  chemicals: [CHL, NITR]\n",
        )
        .unwrap();
        assert_eq!(config.clustering.mode, ClusterMode::Dbscan);
        assert_eq!(config.clustering.eps, 2.5);
        assert_eq!(config.clustering.min_points, 5);
        assert_eq!(config.data.chemicals, Some(vec![Chemical::Chl, Chemical::Nitr]));
        assert_eq!(config.output.map_scale, 8);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = OceanClusterConfig::default();
        config.apply_env_overrides(env(&[
            ("OCEAN_DATA_PATH", "/data/model.npz"),
            ("OCEAN_OUTPUT_DIR", "/tmp/out"),
            ("OCEAN_DATES_PATH", ""),
        ]));
        assert_eq!(config.data.data_path, PathBuf::from("/data/model.npz"));
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.data.dates_path, Some(PathBuf::from("datetimes.txt")));
    }

    #[test]
    fn test_validate_rejects_conflicting_cuts() {
        let mut config = OceanClusterConfig::default();
        config.clustering.mode = ClusterMode::Hierarchical;
        config.clustering.distance_threshold = Some(3.0);
        assert!(config.validate().is_err());
        config.clustering.n_clusters = None;
        config.validate().unwrap();
    }
}
