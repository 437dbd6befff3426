//! Pack sizing results.

use serde::{Deserialize, Serialize};

use crate::pack::requirement::PackRequirement;

/// A series/parallel layout that satisfies a [`PackRequirement`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackSizing {
    /// Cells per series string (S).
    pub series_count: u32,

    /// Number of series strings wired in parallel (P).
    pub parallel_count: u32,

    /// `series_count * parallel_count`.
    pub total_cells: u64,

    /// Installed capacity needed to cover losses (mAh).
    pub required_total_capacity_mah: f64,

    /// Stored energy of the whole pack (Wh).
    pub pack_energy_wh: f64,

    /// Nominal pack voltage (V).
    pub pack_voltage_v: f64,

    /// Nominal pack capacity (mAh).
    pub pack_capacity_mah: f64,
}

impl PackSizing {
    /// Builds a sizing from chosen counts.
    #[must_use]
    pub fn from_counts(
        req: &PackRequirement,
        series_count: u32,
        parallel_count: u32,
        required_total_capacity_mah: f64,
    ) -> Self {
        let pack_voltage_v = f64::from(series_count) * req.cell_nominal_voltage_v;
        let pack_capacity_mah = f64::from(parallel_count) * req.cell_capacity_mah;

        Self {
            series_count,
            parallel_count,
            total_cells: u64::from(series_count) * u64::from(parallel_count),
            required_total_capacity_mah,
            pack_energy_wh: pack_voltage_v * pack_capacity_mah / 1000.0,
            pack_voltage_v,
            pack_capacity_mah,
        }
    }

    /// Short layout label such as `10S5P`.
    #[must_use]
    pub fn layout(&self) -> String {
        format!("{}S{}P", self.series_count, self.parallel_count)
    }

    /// Whether this layout meets both the voltage and capacity targets.
    #[must_use]
    pub fn meets(&self, req: &PackRequirement) -> bool {
        self.pack_voltage_v >= req.target_voltage_v
            && self.pack_capacity_mah >= self.required_total_capacity_mah
    }
}
