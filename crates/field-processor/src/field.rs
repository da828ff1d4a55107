//! The 4-D concentration field.

use crate::{FieldError, Result};
use ndarray::{Array4, ArrayView3, Axis};
use ocean_common::{Chemical, ChemicalSelection, OceanError};

/// Concentrations on a lon/lat grid over time.
///
/// Axis order is `(time, lat, lon, chemical)`. The chemical axis holds the
/// channels listed in [`OceanField::chemicals`], in that order. Missing
/// values are NaN.
#[derive(Debug, Clone)]
pub struct OceanField {
    data: Array4<f64>,
    chemicals: Vec<Chemical>,
}

impl OceanField {
    /// Wrap a model matrix whose chemical axis follows the standard channel
    /// order (CHL, DOXY, NITR, PHOS), possibly truncated.
    pub fn new(data: Array4<f64>) -> Result<Self> {
        let n = data.len_of(Axis(3));
        if n > Chemical::ALL.len() {
            return Err(OceanError::shape_mismatch(
                format!("at most {} chemicals", Chemical::ALL.len()),
                format!("{} chemicals", n),
            )
            .into());
        }
        Ok(Self {
            data,
            chemicals: Chemical::ALL[..n].to_vec(),
        })
    }

    /// Wrap a matrix whose chemical axis holds the given channels.
    pub fn with_chemicals(data: Array4<f64>, chemicals: Vec<Chemical>) -> Result<Self> {
        let n = data.len_of(Axis(3));
        if n != chemicals.len() {
            return Err(OceanError::shape_mismatch(
                format!("{} chemicals", chemicals.len()),
                format!("{} on the chemical axis", n),
            )
            .into());
        }
        Ok(Self { data, chemicals })
    }

    pub fn n_times(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_lat(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn n_lon(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn n_chemicals(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    /// `(n_lat, n_lon)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.n_lat(), self.n_lon())
    }

    pub fn chemicals(&self) -> &[Chemical] {
        &self.chemicals
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    pub fn into_inner(self) -> Array4<f64> {
        self.data
    }

    /// Position of a channel on the chemical axis.
    pub fn channel_position(&self, chemical: Chemical) -> Option<usize> {
        self.chemicals.iter().position(|c| *c == chemical)
    }

    /// Positions of every selected channel. Fails if a selected channel is
    /// not present in this field.
    pub fn selected_positions(&self, selection: &ChemicalSelection) -> Result<Vec<usize>> {
        if selection.is_empty() {
            return Err(
                OceanError::invalid_parameter("chemicals", "no chemical selected").into(),
            );
        }
        selection
            .iter()
            .map(|chemical| {
                self.channel_position(chemical).ok_or_else(|| {
                    FieldError::from(OceanError::InvalidChemical {
                        index: chemical.index(),
                        available: self.n_chemicals(),
                    })
                })
            })
            .collect()
    }

    /// Time × lat × lon values of the channel at `index` on the chemical axis.
    pub fn chemical_series(&self, index: usize) -> Result<ArrayView3<'_, f64>> {
        if index >= self.n_chemicals() {
            return Err(OceanError::InvalidChemical {
                index,
                available: self.n_chemicals(),
            }
            .into());
        }
        Ok(self.data.index_axis(Axis(3), index))
    }

    /// Time × lat × lon values of a named channel.
    pub fn series_of(&self, chemical: Chemical) -> Result<ArrayView3<'_, f64>> {
        let position = self
            .channel_position(chemical)
            .ok_or(OceanError::InvalidChemical {
                index: chemical.index(),
                available: self.n_chemicals(),
            })?;
        self.chemical_series(position)
    }

    /// Lat × lon × chemical values at one time step.
    pub fn timestep(&self, t: usize) -> Result<ArrayView3<'_, f64>> {
        if t >= self.n_times() {
            return Err(OceanError::InvalidTimestep {
                index: t,
                available: self.n_times(),
            }
            .into());
        }
        Ok(self.data.index_axis(Axis(0), t))
    }

    /// Fail unless `(lat, lon)` is a cell of this grid.
    pub fn check_location(&self, lat: usize, lon: usize) -> Result<()> {
        if lat >= self.n_lat() || lon >= self.n_lon() {
            return Err(OceanError::InvalidLocation {
                lat,
                lon,
                n_lat: self.n_lat(),
                n_lon: self.n_lon(),
            }
            .into());
        }
        Ok(())
    }

    /// Fraction of values that are NaN.
    pub fn missing_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let missing = self.data.iter().filter(|v| v.is_nan()).count();
        missing as f64 / self.data.len() as f64
    }
}
