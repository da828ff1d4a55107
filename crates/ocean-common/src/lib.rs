//! Common types and utilities shared across the ocean clustering crates.

pub mod bbox;
pub mod chemical;
pub mod error;
pub mod grid;
pub mod time;

pub use bbox::BoundingBox;
pub use chemical::{Chemical, ChemicalSelection};
pub use error::{OceanError, OceanResult};
pub use grid::LonLatGrid;
pub use time::Timeline;
