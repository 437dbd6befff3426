//! Human-readable sizing summaries.

use std::fmt::Write;

use crate::pack::requirement::PackRequirement;
use crate::pack::sizing::PackSizing;

/// Formats a sizing result as a short multi-line summary.
///
/// # Examples
///
/// ```
/// use cellpack_mcp::pack::{report, size_direct, PackRequirement};
///
/// let req = PackRequirement::new(10_000.0, 36.0, 3000.0, 3.7, 20.0);
/// let sizing = size_direct(&req).unwrap();
/// let text = report::summary(&req, &sizing);
///
/// assert!(text.contains("Series cells (S): 10"));
/// assert!(text.contains("Pack energy: 555.0 Wh"));
/// ```
#[must_use]
pub fn summary(req: &PackRequirement, sizing: &PackSizing) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Adjusted for {:.1}% system losses:", req.loss_percent);
    let _ = writeln!(out, "Series cells (S): {}", sizing.series_count);
    let _ = writeln!(out, "Parallel cells (P): {}", sizing.parallel_count);
    let _ = writeln!(out, "Total cells needed: {}", sizing.total_cells);
    out.push('\n');
    let _ = writeln!(
        out,
        "Required total cell capacity: {:.0} mAh",
        sizing.required_total_capacity_mah
    );
    let _ = writeln!(out, "Pack voltage: {:.1} V", sizing.pack_voltage_v);
    let _ = writeln!(out, "Pack capacity: {:.0} mAh", sizing.pack_capacity_mah);
    let _ = write!(out, "Pack energy: {:.1} Wh", sizing.pack_energy_wh);

    out
}
