//! Library side of the `ocean-cluster` tool: configuration, subcommand
//! implementations and result writers.

pub mod commands;
pub mod config;
pub mod output;

pub use commands::ElbowTarget;
pub use config::{ClusteringConfig, DataConfig, OceanClusterConfig, OutputConfig};
pub use output::OutputWriter;
