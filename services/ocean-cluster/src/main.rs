//! Ocean field clustering tool.
//!
//! Loads gridded biogeochemical model output (CHL, DOXY, NITR, PHOS over
//! time, latitude and longitude), clusters it in space or in time and
//! writes label arrays, JSON reports and PNG maps or charts.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cluster_engine::{ClusterMode, DbscanMetric, Linkage};
use ocean_cluster::commands::{self, ElbowTarget};
use ocean_cluster::OceanClusterConfig;
use ocean_common::{Chemical, ChemicalSelection};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ocean-cluster", version)]
#[command(about = "Cluster ocean biogeochemistry model output")]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, global = true, env = "OCEAN_CLUSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Model matrix (.npz or .npy)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Coordinate array (.npz or .npy)
    #[arg(long, global = true)]
    lons_lats: Option<PathBuf>,

    /// Dates file, one date per line
    #[arg(long, global = true)]
    dates: Option<PathBuf>,

    /// Directory for results
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Clustering backend: kmeans, dbscan or hierarchical
    #[arg(long, global = true)]
    mode: Option<ClusterMode>,

    /// Number of clusters (k-means, hierarchical cut)
    #[arg(short = 'k', long, global = true)]
    n_clusters: Option<usize>,

    /// DBSCAN neighbourhood radius
    #[arg(long, global = true)]
    eps: Option<f64>,

    /// DBSCAN core point threshold
    #[arg(long, global = true)]
    min_points: Option<usize>,

    /// DBSCAN metric: euclidean, manhattan or chebyshev
    #[arg(long, global = true)]
    metric: Option<DbscanMetric>,

    /// Hierarchical linkage: ward, complete, average or single
    #[arg(long, global = true)]
    linkage: Option<Linkage>,

    /// Cut the hierarchical tree at this distance instead of at a cluster count
    #[arg(long, global = true)]
    distance_threshold: Option<f64>,

    /// Random seed for k-means
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Renumber clusters by size, smallest first
    #[arg(long, global = true)]
    sort: bool,

    /// Skip PNG output
    #[arg(long, global = true)]
    no_png: bool,

    /// Log timings and cluster sizes
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Average the field over windows of N time steps and save it
    Average {
        /// Window length in time steps
        #[arg(long)]
        delta_t: usize,

        /// Comma separated chemicals to keep (default: all)
        #[arg(long)]
        chemicals: Option<String>,

        /// Output archive (default: <output-dir>/av_model_data<N>.npz)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Cluster grid cells by the time series of one chemical
    Spatial {
        #[arg(long, default_value = "CHL")]
        chemical: Chemical,
    },

    /// Cluster grid cells by their chemical values at one time step
    Timestep {
        #[arg(long)]
        index: usize,
    },

    /// Cluster time steps at one cell, or over the spatial mean
    Timewise {
        #[arg(long, requires = "lon")]
        lat: Option<usize>,

        #[arg(long, requires = "lat")]
        lon: Option<usize>,

        /// Comma separated chemicals to use (default: all)
        #[arg(long)]
        chemicals: Option<String>,
    },

    /// Draw one chemical's concentration at one time step
    Map {
        #[arg(long, default_value = "CHL")]
        chemical: Chemical,

        #[arg(long, default_value_t = 0)]
        timestep: usize,

        /// Value at the low end of the colour ramp
        #[arg(long, requires = "vmax")]
        vmin: Option<f64>,

        /// Value at the high end of the colour ramp
        #[arg(long, requires = "vmin")]
        vmax: Option<f64>,
    },

    /// K-means inertia for a range of cluster counts
    Elbow {
        #[arg(long, default_value_t = 2)]
        k_min: usize,

        #[arg(long, default_value_t = 20)]
        k_max: usize,

        /// Cluster cells by this chemical's time series
        #[arg(long, conflicts_with_all = ["timestep", "timewise"])]
        chemical: Option<Chemical>,

        /// Cluster cells by their chemical values at this time step
        #[arg(long, conflicts_with = "timewise")]
        timestep: Option<usize>,

        /// Cluster time steps instead of cells
        #[arg(long)]
        timewise: bool,

        /// Cell for --timewise (default: spatial mean)
        #[arg(long, requires_all = ["timewise", "lon"])]
        lat: Option<usize>,

        #[arg(long, requires_all = ["timewise", "lat"])]
        lon: Option<usize>,

        /// Comma separated chemicals for --timewise (default: all)
        #[arg(long, requires = "timewise")]
        chemicals: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Average { .. } => "average",
            Command::Spatial { .. } => "spatial",
            Command::Timestep { .. } => "timestep",
            Command::Timewise { .. } => "timewise",
            Command::Map { .. } => "map",
            Command::Elbow { .. } => "elbow",
        }
    }
}

impl Args {
    fn apply_overrides(&self, config: &mut OceanClusterConfig) {
        if let Some(path) = &self.data {
            config.data.data_path = path.clone();
        }
        if let Some(path) = &self.lons_lats {
            config.data.lons_lats_path = path.clone();
        }
        if let Some(path) = &self.dates {
            config.data.dates_path = Some(path.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }

        let clustering = &mut config.clustering;
        if let Some(mode) = self.mode {
            clustering.mode = mode;
        }
        if let Some(k) = self.n_clusters {
            clustering.n_clusters = Some(k);
        }
        if let Some(threshold) = self.distance_threshold {
            clustering.distance_threshold = Some(threshold);
            // A distance cut replaces the configured cluster count.
            if self.n_clusters.is_none() {
                clustering.n_clusters = None;
            }
        }
        if let Some(eps) = self.eps {
            clustering.eps = eps;
        }
        if let Some(min_points) = self.min_points {
            clustering.min_points = min_points;
        }
        if let Some(metric) = self.metric {
            clustering.metric = metric;
        }
        if let Some(linkage) = self.linkage {
            clustering.linkage = linkage;
        }
        if let Some(seed) = self.seed {
            clustering.seed = seed;
        }
        clustering.sort_by_size |= self.sort;
        clustering.verbose |= self.verbose;
        if self.no_png {
            config.output.png = false;
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn selection(chemicals: Option<&str>) -> Result<ChemicalSelection> {
    Ok(match chemicals {
        Some(list) => ChemicalSelection::parse_list(list)?,
        None => ChemicalSelection::all(),
    })
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    let mut config = OceanClusterConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    info!(
        command = args.command.name(),
        data = %config.data.data_path.display(),
        mode = %config.clustering.mode,
        "Starting ocean-cluster"
    );

    let written = match &args.command {
        Command::Average {
            delta_t,
            chemicals,
            out,
        } => commands::average(&config, *delta_t, &selection(chemicals.as_deref())?, out.clone())?,
        Command::Spatial { chemical } => commands::spatial(&config, *chemical)?,
        Command::Timestep { index } => commands::timestep(&config, *index)?,
        Command::Timewise { lat, lon, chemicals } => {
            let location = lat.zip(*lon);
            commands::timewise(&config, location, &selection(chemicals.as_deref())?)?
        }
        Command::Map {
            chemical,
            timestep,
            vmin,
            vmax,
        } => commands::map(&config, *timestep, *chemical, vmin.zip(*vmax))?,
        Command::Elbow {
            k_min,
            k_max,
            chemical,
            timestep,
            timewise,
            lat,
            lon,
            chemicals,
        } => {
            let target = match (*timewise, *timestep) {
                (true, _) => ElbowTarget::Timewise {
                    location: lat.zip(*lon),
                    selection: selection(chemicals.as_deref())?,
                },
                (false, Some(t)) => ElbowTarget::Timestep(t),
                (false, None) => ElbowTarget::Chemical(chemical.unwrap_or(Chemical::Chl)),
            };
            commands::elbow(&config, target, *k_min, *k_max)?
        }
    };

    for path in &written {
        info!(path = %path.display(), "Wrote output");
    }
    info!(command = args.command.name(), files = written.len(), "Done");
    Ok(())
}
