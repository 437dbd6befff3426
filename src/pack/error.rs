//! Error types for pack sizing.

use thiserror::Error;

/// Result type for pack sizing operations.
pub type SizingResult<T> = Result<T, SizingError>;

/// Errors that can occur while sizing a pack.
///
/// An unsatisfiable search is not an error: the search entry points return
/// `Ok(None)` for that case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    /// Loss percentage leaves a usable fraction outside `(0, 1]`.
    #[error("loss percentage must be in [0, 100), got {loss_percent}")]
    InvalidLoss {
        /// The rejected loss percentage.
        loss_percent: f64,
    },

    /// A per-cell quantity used as a divisor is zero.
    #[error("{quantity} must not be zero")]
    DivisionByZero {
        /// Name of the zero quantity.
        quantity: &'static str,
    },

    /// A computed cell count came out as zero or negative.
    #[error("computed {quantity} is not positive ({value})")]
    NonPositiveResult {
        /// Name of the count.
        quantity: &'static str,
        /// The raw computed value.
        value: f64,
    },

    /// A computed cell count does not fit in a `u32`.
    #[error("computed {quantity} is too large ({value})")]
    CountOverflow {
        /// Name of the count.
        quantity: &'static str,
        /// The raw computed value.
        value: f64,
    },

    /// A per-cell quantity is negative.
    #[error("{name} must be positive, got {value}")]
    NonPositiveInput {
        /// Name of the offending input.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An input is NaN or infinite.
    #[error("{name} must be a finite number, got {value}")]
    InvalidInput {
        /// Name of the offending input.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}
