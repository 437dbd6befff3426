//! Raw user inputs and unit handling.
//!
//! Callers collect values in whatever units the user typed. [`PackInputs`]
//! converts them into a [`PackRequirement`] in mAh and volts, applying the
//! cell-capacity variation on the way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pack::error::{SizingError, SizingResult};
use crate::pack::requirement::PackRequirement;

/// Unit of a capacity value as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityUnit {
    /// Milliamp-hours.
    #[default]
    #[serde(rename = "mAh")]
    MilliampHours,

    /// Amp-hours.
    #[serde(rename = "Ah")]
    AmpHours,
}

impl CapacityUnit {
    /// Parses a capacity unit from a string.
    ///
    /// Accepts "mAh" and "Ah" (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mah" => Some(Self::MilliampHours),
            "ah" => Some(Self::AmpHours),
            _ => None,
        }
    }

    /// Converts a value in this unit to mAh.
    #[must_use]
    pub fn to_mah(self, value: f64) -> f64 {
        match self {
            Self::MilliampHours => value,
            Self::AmpHours => value * 1000.0,
        }
    }
}

impl fmt::Display for CapacityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MilliampHours => write!(f, "mAh"),
            Self::AmpHours => write!(f, "Ah"),
        }
    }
}

/// Pack inputs as collected from a form or command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackInputs {
    /// Usable capacity the pack must deliver, in `capacity_unit`.
    pub target_capacity: f64,

    /// Unit of `target_capacity`.
    #[serde(default)]
    pub capacity_unit: CapacityUnit,

    /// Minimum pack voltage (V).
    pub target_voltage_v: f64,

    /// Rated capacity of one cell (mAh).
    pub cell_capacity_mah: f64,

    /// Nominal voltage of one cell (V).
    pub cell_nominal_voltage_v: f64,

    /// System losses in percent.
    pub loss_percent: f64,

    /// Share of the rated cell capacity actually delivered, in percent.
    /// 100 means the cell meets its rating.
    pub variation_percent: f64,
}

impl PackInputs {
    /// Effective cell capacity after variation (mAh).
    #[must_use]
    pub fn effective_cell_capacity_mah(&self) -> f64 {
        self.cell_capacity_mah * self.variation_percent / 100.0
    }

    /// Converts the raw inputs into a sizing requirement.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidInput`] if the variation or the target
    /// capacity is NaN or infinite. Range checks are left to the sizer.
    pub fn to_requirement(&self) -> SizingResult<PackRequirement> {
        for (name, value) in [
            ("target capacity", self.target_capacity),
            ("variation percentage", self.variation_percent),
        ] {
            if !value.is_finite() {
                return Err(SizingError::InvalidInput { name, value });
            }
        }

        Ok(PackRequirement::new(
            self.capacity_unit.to_mah(self.target_capacity),
            self.target_voltage_v,
            self.effective_cell_capacity_mah(),
            self.cell_nominal_voltage_v,
            self.loss_percent,
        ))
    }
}
