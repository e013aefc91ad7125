//! Support generation parameters.

use crate::error::SupportError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a strut's radius is derived from its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum StrutRadiusModel {
    /// `r = max(1, coefficient · length · tilt)` where `tilt` is the
    /// angle (radians) between the strut and +Z, substituted by 1 for
    /// perfectly vertical struts.
    ///
    /// Tilted struts carry load in bending, so they get thicker.
    #[default]
    AngleScaled,

    /// `r = max(1, coefficient · length)`, independent of tilt.
    Uniform,
}

/// Configuration for the support generator.
///
/// Use the builder methods to adjust individual knobs, then pass the
/// whole record to [`generate_supports`](crate::generate_supports).
///
/// # Examples
///
/// ```
/// use support_tree::SupportParams;
///
/// let params = SupportParams::new()
///     .with_grid_density(6)
///     .with_diameter_coefficient(0.05);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SupportParams {
    /// Overhang angle limit in radians, measured from the build-plane
    /// normal (+Z). Faces looking more than this far below horizontal
    /// need support; struts stay within the self-support cone of this
    /// half-angle. Valid range `[0, π/2]`.
    pub angle_limit: f64,

    /// Number of sample rows per overhanging triangle side. At least 2.
    pub grid_density: usize,

    /// Strut-radius multiplier. Valid range `[0, 1]`.
    pub diameter_coefficient: f64,

    /// Strut radius formula.
    pub radius_model: StrutRadiusModel,
}

impl Default for SupportParams {
    fn default() -> Self {
        Self {
            angle_limit: 60.0_f64.to_radians(),
            grid_density: 4,
            diameter_coefficient: 0.07,
            radius_model: StrutRadiusModel::AngleScaled,
        }
    }
}

impl SupportParams {
    /// Creates parameters with default values (60° limit, density 4,
    /// coefficient 0.07).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overhang angle limit in radians.
    #[must_use]
    pub const fn with_angle_limit(mut self, radians: f64) -> Self {
        self.angle_limit = radians;
        self
    }

    /// Sets the overhang angle limit in degrees.
    #[must_use]
    pub fn with_angle_limit_degrees(mut self, degrees: f64) -> Self {
        self.angle_limit = degrees.to_radians();
        self
    }

    /// Sets the sampling density per overhanging triangle side.
    #[must_use]
    pub const fn with_grid_density(mut self, density: usize) -> Self {
        self.grid_density = density;
        self
    }

    /// Sets the strut-radius multiplier.
    #[must_use]
    pub const fn with_diameter_coefficient(mut self, coefficient: f64) -> Self {
        self.diameter_coefficient = coefficient;
        self
    }

    /// Sets the strut radius formula.
    #[must_use]
    pub const fn with_radius_model(mut self, model: StrutRadiusModel) -> Self {
        self.radius_model = model;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SupportError`] describing the first invalid parameter
    /// found.
    pub fn validate(&self) -> Result<(), SupportError> {
        if !self.angle_limit.is_finite()
            || self.angle_limit < 0.0
            || self.angle_limit > std::f64::consts::FRAC_PI_2
        {
            return Err(SupportError::InvalidAngleLimit(self.angle_limit));
        }

        if self.grid_density < 2 {
            return Err(SupportError::InvalidGridDensity(self.grid_density));
        }

        if !self.diameter_coefficient.is_finite()
            || !(0.0..=1.0).contains(&self.diameter_coefficient)
        {
            return Err(SupportError::InvalidDiameterCoefficient(
                self.diameter_coefficient,
            ));
        }

        Ok(())
    }
}
