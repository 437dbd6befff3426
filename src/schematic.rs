//! ASCII schematic of a series/parallel cell grid.
//!
//! Each parallel string is drawn as one row of cells joined in series, with
//! bus bars linking the ends of every string:
//!
//! ```text
//! Pack: 3S2P (6 cells)
//! (+)-+-[#]-[#]-[#]-+-(-)
//!     |             |
//!     +-[#]-[#]-[#]-+
//! Legend: [#] = cell, ... = cells not drawn, | = parallel bus, (+)/(-) = pack terminals
//! ```
//!
//! Strings longer than the width budget are shortened with `...`, and packs
//! with more strings than the height budget show a `: N more strings` line.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Narrowest canvas that still fits three cells on the first row.
pub const MIN_WIDTH: usize = 23;

/// Lowest canvas that still fits three strings.
pub const MIN_HEIGHT: usize = 5;

/// Widest canvas rendered, whatever the caller asks for.
pub const MAX_WIDTH: usize = 400;

/// Tallest canvas rendered, whatever the caller asks for.
pub const MAX_HEIGHT: usize = 200;

const CELL: &str = "[#]";
const ELLIPSIS: &str = "...";

/// Size limits for the rendered diagram (the grid only, not header or legend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicOptions {
    /// Maximum characters per diagram line.
    pub max_width: usize,
    /// Maximum number of diagram lines.
    pub max_height: usize,
}

impl SchematicOptions {
    /// Limits pulled into `MIN_WIDTH..=MAX_WIDTH` and `MIN_HEIGHT..=MAX_HEIGHT`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            max_width: self.max_width.clamp(MIN_WIDTH, MAX_WIDTH),
            max_height: self.max_height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        }
    }
}

impl Default for SchematicOptions {
    fn default() -> Self {
        Self {
            max_width: 80,
            max_height: 40,
        }
    }
}

/// One row slot in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// A drawn string; `true` for the string carrying the pack terminals.
    Drawn(bool),
    /// A run of strings that are not drawn.
    Elided(u32),
}

/// Renders a pack of `series` × `parallel` cells as ASCII art.
///
/// The limits are clamped first, so the output size is bounded for any
/// counts.
#[must_use]
pub fn render_ascii(series: u32, parallel: u32, options: &SchematicOptions) -> String {
    if series == 0 || parallel == 0 {
        return "Empty pack (no cells)".to_string();
    }
    let options = options.clamped();

    let body = string_body(series, max_cells(options.max_width));
    let bus_gap = " ".repeat(body.len() + 2);

    let mut output = String::new();
    let _ = writeln!(
        output,
        "Pack: {series}S{parallel}P ({} cells)",
        u64::from(series) * u64::from(parallel)
    );

    for (index, slot) in slots(parallel, max_strings(options.max_height))
        .into_iter()
        .enumerate()
    {
        if index > 0 {
            let _ = writeln!(output, "    |{bus_gap}|");
        }
        match slot {
            Slot::Drawn(true) => {
                let _ = writeln!(output, "(+)-+-{body}-+-(-)");
            }
            Slot::Drawn(false) => {
                let _ = writeln!(output, "    +-{body}-+");
            }
            Slot::Elided(hidden) => {
                let _ = writeln!(output, "    : {hidden} more strings");
            }
        }
    }

    output.push_str(
        "Legend: [#] = cell, ... = cells not drawn, | = parallel bus, (+)/(-) = pack terminals\n",
    );

    output
}

/// Number of cell glyphs that fit on the widest (terminal) row.
///
/// That row is `(+)-+-` + body + `-+-(-)`, and a body of `n` glyphs is
/// `4n - 1` characters wide, so the row takes `4n + 11`.
fn max_cells(max_width: usize) -> usize {
    (max_width.saturating_sub(11) / 4).max(3)
}

/// Number of string rows that fit, each after the first costing a bus line.
fn max_strings(max_height: usize) -> usize {
    (max_height.saturating_add(1) / 2).max(3)
}

/// Draws one series string, eliding the middle if it is too long.
fn string_body(series: u32, max_cells: usize) -> String {
    let series = usize::try_from(series).unwrap_or(usize::MAX);

    let glyphs: Vec<&str> = if series <= max_cells {
        vec![CELL; series]
    } else {
        let mut glyphs = vec![CELL; max_cells - 2];
        glyphs.push(ELLIPSIS);
        glyphs.push(CELL);
        glyphs
    };

    glyphs.join("-")
}

/// Chooses which strings to draw.
fn slots(parallel: u32, max_strings: usize) -> Vec<Slot> {
    let parallel_rows = usize::try_from(parallel).unwrap_or(usize::MAX);

    if parallel_rows <= max_strings {
        return (0..parallel_rows).map(|i| Slot::Drawn(i == 0)).collect();
    }

    let shown = u32::try_from(max_strings - 1).unwrap_or(u32::MAX);
    let mut slots: Vec<Slot> = (0..max_strings - 2).map(|i| Slot::Drawn(i == 0)).collect();
    slots.push(Slot::Elided(parallel - shown));
    slots.push(Slot::Drawn(false));
    slots
}
