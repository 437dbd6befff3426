//! Layout preferences for the bounded search.
//!
//! The direct sizing always picks the smallest series and parallel counts
//! independently. The search mode instead walks the whole bounded S×P grid
//! and lets the caller bias the shape of the pack:
//!
//! - **Balanced**: fewest total cells
//! - **More series**: longest series string, then fewest strings
//! - **More parallel**: most parallel strings, then shortest string

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape bias applied when several layouts meet the targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreference {
    /// Minimise `S * P`. Ties go to the first candidate in enumeration order.
    #[default]
    Balanced,

    /// Maximise `S`, then minimise `P`.
    MoreSeries,

    /// Maximise `P`, then minimise `S`.
    MoreParallel,
}

impl LayoutPreference {
    /// All preferences, in display order.
    pub const ALL: [Self; 3] = [Self::Balanced, Self::MoreSeries, Self::MoreParallel];

    /// Parses a preference from a string.
    ///
    /// Accepts "balanced", "more-series", "more_series", "series",
    /// "more-parallel", "more_parallel", "parallel" (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "balanced" => Some(Self::Balanced),
            "more_series" | "series" => Some(Self::MoreSeries),
            "more_parallel" | "parallel" => Some(Self::MoreParallel),
            _ => None,
        }
    }

    /// Selection key for a feasible `(s, p)` candidate; larger wins.
    ///
    /// `Balanced` inverts the cell count so that "larger wins" still means
    /// "fewer cells".
    #[must_use]
    #[allow(clippy::cast_lossless)] // i64::from is not const
    pub(crate) const fn rank(self, series: u32, parallel: u32) -> (i64, i64) {
        let s = series as i64;
        let p = parallel as i64;
        match self {
            Self::Balanced => (-(s * p), 0),
            Self::MoreSeries => (s, -p),
            Self::MoreParallel => (p, -s),
        }
    }
}

impl fmt::Display for LayoutPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Balanced => write!(f, "balanced"),
            Self::MoreSeries => write!(f, "more-series"),
            Self::MoreParallel => write!(f, "more-parallel"),
        }
    }
}
