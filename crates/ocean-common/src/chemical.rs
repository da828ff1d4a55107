//! The four chemical channels carried by the model output.

use crate::{OceanError, OceanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A chemical concentration channel.
///
/// The discriminant is the index of the channel along the last axis of the
/// model matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chemical {
    /// Chlorophyll
    Chl = 0,
    /// Dissolved oxygen
    Doxy = 1,
    /// Nitrate
    Nitr = 2,
    /// Phosphate
    Phos = 3,
}

impl Chemical {
    /// All channels in array order.
    pub const ALL: [Chemical; 4] = [Chemical::Chl, Chemical::Doxy, Chemical::Nitr, Chemical::Phos];

    /// Index of this channel along the chemical axis.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a channel by its array index.
    pub fn from_index(index: usize) -> OceanResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(OceanError::InvalidChemical {
                index,
                available: Self::ALL.len(),
            })
    }

    /// Short variable name used in the model files.
    pub fn short_name(self) -> &'static str {
        match self {
            Chemical::Chl => "CHL",
            Chemical::Doxy => "DOXY",
            Chemical::Nitr => "NITR",
            Chemical::Phos => "PHOS",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Chemical::Chl => "chlorophyll",
            Chemical::Doxy => "dissolved oxygen",
            Chemical::Nitr => "nitrate",
            Chemical::Phos => "phosphate",
        }
    }
}

impl fmt::Display for Chemical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Chemical {
    type Err = OceanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return Self::from_index(index);
        }
        match trimmed.to_uppercase().as_str() {
            "CHL" => Ok(Chemical::Chl),
            "DOXY" | "O2" => Ok(Chemical::Doxy),
            "NITR" | "NO3" => Ok(Chemical::Nitr),
            "PHOS" | "PO4" => Ok(Chemical::Phos),
            _ => Err(OceanError::UnknownChemical(s.to_string())),
        }
    }
}

/// Which chemical channels take part in an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalSelection {
    mask: [bool; 4],
}

impl Default for ChemicalSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl ChemicalSelection {
    /// Select every channel.
    pub fn all() -> Self {
        Self { mask: [true; 4] }
    }

    /// Select nothing.
    pub fn none() -> Self {
        Self { mask: [false; 4] }
    }

    /// Build from a boolean mask in channel order.
    pub fn from_mask(mask: [bool; 4]) -> Self {
        Self { mask }
    }

    /// Build from a list of channels.
    pub fn from_chemicals(chemicals: &[Chemical]) -> Self {
        let mut selection = Self::none();
        for chemical in chemicals {
            selection.mask[chemical.index()] = true;
        }
        selection
    }

    /// Parse a comma separated list, e.g. `CHL,NITR`.
    pub fn parse_list(s: &str) -> OceanResult<Self> {
        let chemicals = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Chemical::from_str)
            .collect::<OceanResult<Vec<_>>>()?;
        if chemicals.is_empty() {
            return Err(OceanError::invalid_parameter(
                "chemicals",
                "at least one chemical must be selected",
            ));
        }
        Ok(Self::from_chemicals(&chemicals))
    }

    pub fn contains(&self, chemical: Chemical) -> bool {
        self.mask[chemical.index()]
    }

    /// Number of selected channels.
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Selected channels in array order.
    pub fn iter(&self) -> impl Iterator<Item = Chemical> + '_ {
        Chemical::ALL
            .into_iter()
            .filter(move |chemical| self.contains(*chemical))
    }

    pub fn to_vec(&self) -> Vec<Chemical> {
        self.iter().collect()
    }
}
