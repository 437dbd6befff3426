//! Battery pack sizing.
//!
//! Given a target usable capacity and voltage, the specs of a single
//! cylindrical cell and a loss margin, this module works out how many cells
//! to wire in series (S) and in parallel (P).
//!
//! # Modes
//!
//! - **Direct**: smallest S and smallest P, each by ceiling division
//! - **Preference search**: best layout inside a bounded S×P grid for a
//!   [`LayoutPreference`], or `None` if nothing in the grid fits
//!
//! Both modes are pure functions of their inputs.
//!
//! # Example
//!
//! ```
//! use cellpack_mcp::pack::{size_by_preference, size_direct, LayoutPreference, PackRequirement};
//!
//! // 10 Ah usable at 36 V from 3000 mAh / 3.7 V cells with 20% losses
//! let req = PackRequirement::new(10_000.0, 36.0, 3000.0, 3.7, 20.0);
//!
//! let direct = size_direct(&req).unwrap();
//! assert_eq!(direct.layout(), "10S5P");
//!
//! let tall = size_by_preference(&req, LayoutPreference::MoreSeries).unwrap();
//! assert_eq!(tall.map(|s| s.layout()), Some("20S5P".to_string()));
//! ```

pub mod error;
pub mod preference;
pub mod report;
pub mod requirement;
pub mod sizer;
pub mod sizing;
pub mod units;

pub use error::{SizingError, SizingResult};
pub use preference::LayoutPreference;
pub use requirement::PackRequirement;
pub use sizer::{size_by_preference, size_direct, PackSizer, SearchBounds};
pub use sizing::PackSizing;
pub use units::{CapacityUnit, PackInputs};
