//! Error taxonomy for material balance calculations
//!
//! Four failure classes flow through the crate:
//! - Configuration: bad inputs caught before any physics runs (missing PVT
//!   property, mismatched array lengths, contradictory parameters)
//! - Domain: physically degenerate computation (non-positive expansion,
//!   near-zero denominator, radius ordering violations)
//! - Convergence: an iterative solver hit its iteration cap
//! - EmptyBatch: a batch produced zero valid points
//!
//! Batch operations recover Domain errors per-point (logged, NaN-marked);
//! everything else propagates to the immediate caller.

use thiserror::Error;

/// Errors raised by the material balance core.
#[derive(Error, Debug)]
pub enum MbalError {
    /// A PVT property required by the calculation was never supplied.
    #[error("required PVT property `{property}` was not provided in the table")]
    MissingProperty { property: &'static str },

    /// Invalid or contradictory construction input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Physically degenerate computation; fatal to the single point.
    #[error("domain error: {0}")]
    Domain(String),

    /// Newton-Raphson iteration exceeded its cap without meeting tolerance.
    #[error(
        "solver did not converge after {max_iterations} iterations (last value = {last_value})"
    )]
    Convergence {
        max_iterations: usize,
        last_value: f64,
    },

    /// A batch produced no valid estimates at all.
    #[error("no valid estimates: all {attempted} points in the batch failed")]
    EmptyBatch { attempted: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MbalError>;
