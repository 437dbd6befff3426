//! Pack sizing inputs.

use serde::{Deserialize, Serialize};

use crate::pack::error::{SizingError, SizingResult};

/// What the pack has to deliver and what a single cell provides.
///
/// All capacities are in mAh and all voltages in volts. The cell capacity is
/// the effective value, i.e. any manufacturing variation has already been
/// applied (see [`crate::pack::units::PackInputs`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackRequirement {
    /// Capacity the pack must deliver after losses (mAh).
    pub target_usable_capacity_mah: f64,

    /// Minimum pack voltage (V).
    pub target_voltage_v: f64,

    /// Capacity of a single cell (mAh).
    pub cell_capacity_mah: f64,

    /// Nominal voltage of a single cell (V).
    pub cell_nominal_voltage_v: f64,

    /// Capacity lost to system overhead and derating, in percent.
    pub loss_percent: f64,
}

impl PackRequirement {
    /// Creates a new requirement.
    #[must_use]
    pub const fn new(
        target_usable_capacity_mah: f64,
        target_voltage_v: f64,
        cell_capacity_mah: f64,
        cell_nominal_voltage_v: f64,
        loss_percent: f64,
    ) -> Self {
        Self {
            target_usable_capacity_mah,
            target_voltage_v,
            cell_capacity_mah,
            cell_nominal_voltage_v,
            loss_percent,
        }
    }

    /// Rejects NaN and infinite inputs.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidInput`] naming the first offending field.
    pub fn ensure_finite(&self) -> SizingResult<()> {
        let fields = [
            ("target usable capacity", self.target_usable_capacity_mah),
            ("target voltage", self.target_voltage_v),
            ("cell capacity", self.cell_capacity_mah),
            ("cell nominal voltage", self.cell_nominal_voltage_v),
            ("loss percentage", self.loss_percent),
        ];

        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(SizingError::InvalidInput { name, value }),
            None => Ok(()),
        }
    }

    /// Fraction of the installed capacity that remains usable after losses.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidLoss`] if the fraction is outside `(0, 1]`.
    pub fn usable_fraction(&self) -> SizingResult<f64> {
        let fraction = 1.0 - self.loss_percent / 100.0;
        if fraction <= 0.0 || fraction > 1.0 {
            return Err(SizingError::InvalidLoss {
                loss_percent: self.loss_percent,
            });
        }
        Ok(fraction)
    }

    /// Installed capacity needed so that the usable capacity meets the target.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidLoss`] if the loss percentage is out of range.
    pub fn required_total_capacity_mah(&self) -> SizingResult<f64> {
        Ok(self.target_usable_capacity_mah / self.usable_fraction()?)
    }

    /// Checks that the per-cell divisors are strictly positive.
    ///
    /// # Errors
    ///
    /// - [`SizingError::DivisionByZero`] for a zero cell voltage or capacity
    /// - [`SizingError::NonPositiveInput`] for a negative cell voltage or capacity
    pub fn ensure_cell_divisors(&self) -> SizingResult<()> {
        for (name, value) in [
            ("cell nominal voltage", self.cell_nominal_voltage_v),
            ("cell capacity", self.cell_capacity_mah),
        ] {
            if value == 0.0 {
                return Err(SizingError::DivisionByZero { quantity: name });
            }
            if value < 0.0 {
                return Err(SizingError::NonPositiveInput { name, value });
            }
        }
        Ok(())
    }
}
