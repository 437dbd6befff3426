//! Series/parallel pack sizing.
//!
//! Two entry points:
//!
//! - [`size_direct`] picks the smallest series count that reaches the target
//!   voltage and, independently, the smallest parallel count that covers the
//!   loss-adjusted capacity.
//! - [`size_by_preference`] walks a bounded S×P grid (20×20 by default) and
//!   picks the feasible layout that best matches a [`LayoutPreference`].
//!
//! # Sizing Formulas
//!
//! - Usable fraction = 1 - loss / 100
//! - Required capacity = target usable capacity / usable fraction
//! - S = ceil(target voltage / cell voltage)
//! - P = ceil(required capacity / cell capacity)
//! - Energy (Wh) = (S × cell voltage) × (P × cell capacity) / 1000

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pack::error::{SizingError, SizingResult};
use crate::pack::preference::LayoutPreference;
use crate::pack::requirement::PackRequirement;
use crate::pack::sizing::PackSizing;

/// Default upper bound on the series count explored by the search.
pub const DEFAULT_MAX_SERIES: u32 = 20;

/// Default upper bound on the parallel count explored by the search.
pub const DEFAULT_MAX_PARALLEL: u32 = 20;

/// Inclusive upper bounds of the S×P search grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBounds {
    /// Largest series count considered.
    pub max_series: u32,
    /// Largest parallel count considered.
    pub max_parallel: u32,
}

impl SearchBounds {
    /// Creates search bounds.
    #[must_use]
    pub const fn new(max_series: u32, max_parallel: u32) -> Self {
        Self {
            max_series,
            max_parallel,
        }
    }

    /// Number of `(s, p)` candidates in the grid.
    #[must_use]
    pub fn candidate_count(&self) -> u64 {
        u64::from(self.max_series) * u64::from(self.max_parallel)
    }
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SERIES, DEFAULT_MAX_PARALLEL)
    }
}

/// Pack sizer with a configurable search grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackSizer {
    bounds: SearchBounds,
}

impl PackSizer {
    /// Creates a sizer with the default 20×20 search grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sizer with custom search bounds.
    #[must_use]
    pub const fn with_bounds(bounds: SearchBounds) -> Self {
        Self { bounds }
    }

    /// Returns the search bounds.
    #[must_use]
    pub const fn bounds(&self) -> SearchBounds {
        self.bounds
    }

    /// Sizes a pack by ceiling division.
    ///
    /// # Errors
    ///
    /// - [`SizingError::InvalidInput`] for NaN or infinite inputs
    /// - [`SizingError::InvalidLoss`] if the loss is outside `[0, 100)`
    /// - [`SizingError::DivisionByZero`] for a zero cell voltage or capacity
    /// - [`SizingError::NonPositiveInput`] for a negative cell voltage or capacity
    /// - [`SizingError::NonPositiveResult`] if a count comes out `<= 0`
    /// - [`SizingError::CountOverflow`] if a count does not fit in a `u32`
    pub fn size_direct(&self, req: &PackRequirement) -> SizingResult<PackSizing> {
        let required = prepare(req)?;

        let series = ceil_count("series count", req.target_voltage_v, req.cell_nominal_voltage_v)?;
        let parallel = ceil_count("parallel count", required, req.cell_capacity_mah)?;

        let sizing = PackSizing::from_counts(req, series, parallel, required);
        debug!(
            series,
            parallel,
            total_cells = sizing.total_cells,
            required_mah = required,
            "Direct sizing complete"
        );
        Ok(sizing)
    }

    /// Sizes a pack by searching the bounded S×P grid under a preference.
    ///
    /// Returns `Ok(None)` when no layout inside the grid meets both targets.
    ///
    /// # Errors
    ///
    /// Same input errors as [`Self::size_direct`].
    pub fn size_by_preference(
        &self,
        req: &PackRequirement,
        preference: LayoutPreference,
    ) -> SizingResult<Option<PackSizing>> {
        let required = prepare(req)?;

        let feasible = |&(s, p): &(u32, u32)| {
            f64::from(s) * req.cell_nominal_voltage_v >= req.target_voltage_v
                && f64::from(p) * req.cell_capacity_mah >= required
        };

        // Only a strictly better rank replaces the incumbent, so ties keep
        // the first candidate in (s, p) order.
        let best = grid(self.bounds)
            .filter(feasible)
            .fold(None, |best: Option<(u32, u32)>, (s, p)| match best {
                Some((bs, bp)) if preference.rank(bs, bp) >= preference.rank(s, p) => best,
                _ => Some((s, p)),
            });

        let Some((series, parallel)) = best else {
            debug!(
                %preference,
                max_series = self.bounds.max_series,
                max_parallel = self.bounds.max_parallel,
                "No feasible layout within search bounds"
            );
            return Ok(None);
        };

        debug!(%preference, series, parallel, "Preference sizing complete");
        Ok(Some(PackSizing::from_counts(req, series, parallel, required)))
    }
}

/// Sizes a pack by ceiling division with the default sizer.
///
/// # Errors
///
/// See [`PackSizer::size_direct`].
pub fn size_direct(req: &PackRequirement) -> SizingResult<PackSizing> {
    PackSizer::new().size_direct(req)
}

/// Sizes a pack by searching the default 20×20 grid under a preference.
///
/// # Errors
///
/// See [`PackSizer::size_by_preference`].
pub fn size_by_preference(
    req: &PackRequirement,
    preference: LayoutPreference,
) -> SizingResult<Option<PackSizing>> {
    PackSizer::new().size_by_preference(req, preference)
}

/// Validates inputs shared by both modes and returns the required capacity.
///
/// Non-positive targets fail here with the error direct mode reports for them.
fn prepare(req: &PackRequirement) -> SizingResult<f64> {
    req.ensure_finite()?;
    let required = req.required_total_capacity_mah()?;
    req.ensure_cell_divisors()?;

    for (quantity, target, per_cell) in [
        ("series count", req.target_voltage_v, req.cell_nominal_voltage_v),
        ("parallel count", required, req.cell_capacity_mah),
    ] {
        if target <= 0.0 {
            return Err(SizingError::NonPositiveResult {
                quantity,
                value: (target / per_cell).ceil(),
            });
        }
    }

    Ok(required)
}

/// Enumerates `(s, p)` with ascending `s`, then ascending `p`.
fn grid(bounds: SearchBounds) -> impl Iterator<Item = (u32, u32)> {
    (1..=bounds.max_series).flat_map(move |s| (1..=bounds.max_parallel).map(move |p| (s, p)))
}

/// Smallest whole number of cells whose combined value reaches `target`.
///
/// Equivalent to `ceil(target / per_cell)`, corrected by one step where the
/// rounded quotient would leave `count * per_cell` on the wrong side of
/// `target`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ceil_count(quantity: &'static str, target: f64, per_cell: f64) -> SizingResult<u32> {
    let mut count = (target / per_cell).ceil();

    if per_cell > 0.0 && count.is_finite() && count >= 1.0 {
        if count * per_cell < target {
            count += 1.0;
        } else if count > 1.0 && (count - 1.0) * per_cell >= target {
            count -= 1.0;
        }
    }

    if count.is_nan() || count <= 0.0 {
        return Err(SizingError::NonPositiveResult {
            quantity,
            value: count,
        });
    }
    if count > f64::from(u32::MAX) {
        return Err(SizingError::CountOverflow {
            quantity,
            value: count,
        });
    }

    Ok(count as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> PackRequirement {
        PackRequirement::new(10_000.0, 36.0, 3000.0, 3.7, 20.0)
    }

    #[test]
    fn direct_scenario() {
        let sizing = size_direct(&scenario()).unwrap();
        assert_eq!(sizing.series_count, 10);
        assert_eq!(sizing.parallel_count, 5);
        assert_eq!(sizing.total_cells, 50);
        assert!((sizing.required_total_capacity_mah - 12_500.0).abs() < 1e-9);
        assert!((sizing.pack_energy_wh - 555.0).abs() < 1e-9);
    }

    #[test]
    fn direct_exact_multiple_does_not_round_up() {
        let req = PackRequirement::new(6000.0, 7.4, 3000.0, 3.7, 0.0);
        let sizing = size_direct(&req).unwrap();
        assert_eq!(sizing.series_count, 2);
        assert_eq!(sizing.parallel_count, 2);
    }

    #[test]
    fn direct_is_deterministic() {
        let req = scenario();
        assert_eq!(size_direct(&req).unwrap(), size_direct(&req).unwrap());
    }

    #[test]
    fn direct_rejects_invalid_loss() {
        let mut req = scenario();
        req.loss_percent = 100.0;
        assert!(matches!(
            size_direct(&req),
            Err(SizingError::InvalidLoss { .. })
        ));
    }

    #[test]
    fn direct_rejects_zero_cell_voltage() {
        let mut req = scenario();
        req.cell_nominal_voltage_v = 0.0;
        assert_eq!(
            size_direct(&req),
            Err(SizingError::DivisionByZero {
                quantity: "cell nominal voltage"
            })
        );
    }

    #[test]
    fn direct_rejects_negative_target() {
        let mut req = scenario();
        req.target_voltage_v = -12.0;
        assert!(matches!(
            size_direct(&req),
            Err(SizingError::NonPositiveResult {
                quantity: "series count",
                ..
            })
        ));
    }

    #[test]
    fn direct_rejects_zero_capacity_target() {
        let mut req = scenario();
        req.target_usable_capacity_mah = 0.0;
        assert!(matches!(
            size_direct(&req),
            Err(SizingError::NonPositiveResult {
                quantity: "parallel count",
                ..
            })
        ));
    }

    #[test]
    fn both_modes_reject_negative_cell_and_target() {
        let reqs = [
            PackRequirement::new(1000.0, -10.0, 3000.0, -3.7, 0.0),
            PackRequirement::new(-1000.0, 36.0, -3000.0, 3.7, 0.0),
        ];
        for req in reqs {
            assert!(matches!(
                size_direct(&req),
                Err(SizingError::NonPositiveInput { .. })
            ));
            for preference in LayoutPreference::ALL {
                assert!(matches!(
                    size_by_preference(&req, preference),
                    Err(SizingError::NonPositiveInput { .. })
                ));
            }
        }
    }

    #[test]
    fn search_rejects_non_positive_targets() {
        let mut req = scenario();
        req.target_voltage_v = -12.0;
        assert_eq!(
            size_by_preference(&req, LayoutPreference::MoreSeries),
            Err(SizingError::NonPositiveResult {
                quantity: "series count",
                value: -3.0
            })
        );

        let mut req = scenario();
        req.target_usable_capacity_mah = 0.0;
        assert!(matches!(
            size_by_preference(&req, LayoutPreference::Balanced),
            Err(SizingError::NonPositiveResult {
                quantity: "parallel count",
                ..
            })
        ));
    }

    #[test]
    fn direct_reports_overflow() {
        let req = PackRequirement::new(1.0, 1e300, 1.0, 1e-10, 0.0);
        assert!(matches!(
            size_direct(&req),
            Err(SizingError::CountOverflow {
                quantity: "series count",
                ..
            })
        ));
    }

    #[test]
    fn ceil_count_corrects_rounding() {
        // 0.3 / 0.1 rounds to 2.9999999999999996
        assert_eq!(ceil_count("n", 0.3, 0.1).unwrap(), 3);
        assert!(3.0 * 0.1 >= 0.3);
        assert_eq!(ceil_count("n", 0.7, 0.1).unwrap(), 7);
        assert!(7.0 * 0.1 >= 0.7);
    }

    #[test]
    fn balanced_scenario_matches_direct() {
        let sizing = size_by_preference(&scenario(), LayoutPreference::Balanced)
            .unwrap()
            .unwrap();
        assert_eq!((sizing.series_count, sizing.parallel_count), (10, 5));
    }

    #[test]
    fn more_series_takes_longest_string() {
        let sizing = size_by_preference(&scenario(), LayoutPreference::MoreSeries)
            .unwrap()
            .unwrap();
        assert_eq!((sizing.series_count, sizing.parallel_count), (20, 5));
    }

    #[test]
    fn more_parallel_takes_most_strings() {
        let sizing = size_by_preference(&scenario(), LayoutPreference::MoreParallel)
            .unwrap()
            .unwrap();
        assert_eq!((sizing.series_count, sizing.parallel_count), (10, 20));
    }

    #[test]
    fn balanced_single_cell() {
        let req = PackRequirement::new(1.0, 1.0, 1.0, 1.0, 0.0);
        let sizing = size_by_preference(&req, LayoutPreference::Balanced)
            .unwrap()
            .unwrap();
        assert_eq!((sizing.series_count, sizing.parallel_count), (1, 1));
        assert_eq!(sizing.total_cells, 1);
    }

    #[test]
    fn infeasible_high_voltage() {
        let req = PackRequirement::new(10_000.0, 1000.0, 3000.0, 3.7, 20.0);
        for preference in LayoutPreference::ALL {
            assert_eq!(size_by_preference(&req, preference).unwrap(), None);
        }
    }

    #[test]
    fn custom_bounds_extend_search() {
        let req = PackRequirement::new(10_000.0, 1000.0, 3000.0, 3.7, 20.0);
        let sizer = PackSizer::with_bounds(SearchBounds::new(300, 10));
        let sizing = sizer
            .size_by_preference(&req, LayoutPreference::Balanced)
            .unwrap()
            .unwrap();
        assert_eq!(sizing.series_count, 271);
        assert_eq!(sizing.parallel_count, 5);
    }

    #[test]
    fn empty_bounds_are_infeasible() {
        let sizer = PackSizer::with_bounds(SearchBounds::new(0, 20));
        assert_eq!(
            sizer
                .size_by_preference(&scenario(), LayoutPreference::Balanced)
                .unwrap(),
            None
        );
    }

    #[test]
    fn search_rejects_invalid_loss() {
        let mut req = scenario();
        req.loss_percent = 150.0;
        assert!(matches!(
            size_by_preference(&req, LayoutPreference::Balanced),
            Err(SizingError::InvalidLoss { .. })
        ));
    }

    #[test]
    fn default_bounds() {
        let bounds = SearchBounds::default();
        assert_eq!(bounds.max_series, 20);
        assert_eq!(bounds.max_parallel, 20);
        assert_eq!(bounds.candidate_count(), 400);
    }

    #[test]
    fn grid_order_is_series_major() {
        let cells: Vec<_> = grid(SearchBounds::new(2, 2)).collect();
        assert_eq!(cells, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }
}
