//! Error types for support generation.
//!
//! The geometric core itself cannot fail: empty meshes produce empty
//! results, degenerate faces are skipped and singular intersections
//! fall back to an operand point. Errors only arise from invalid
//! parameters.

use thiserror::Error;

/// Errors that can occur when configuring support generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SupportError {
    /// The overhang angle limit is outside `[0, π/2]` radians.
    #[error("angle limit must be in [0, pi/2] radians, got {0}")]
    InvalidAngleLimit(f64),

    /// The sampling density is below the minimum of 2.
    #[error("grid density must be at least 2, got {0}")]
    InvalidGridDensity(usize),

    /// The strut-radius multiplier is outside `[0, 1]`.
    #[error("diameter coefficient must be in [0, 1], got {0}")]
    InvalidDiameterCoefficient(f64),
}
