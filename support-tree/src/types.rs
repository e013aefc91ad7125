//! Core types for support generation.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a support point lives.
///
/// The router dispatches on this tag: model points get lifted off the
/// surface, common points get routed further down, plate points
/// terminate a strut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointOrigin {
    /// Lies on the surface of the part mesh.
    Model,
    /// An interior junction introduced while routing.
    Common,
    /// Lies on the build plate.
    Plate,
}

impl PointOrigin {
    /// Returns the name of this origin.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Common => "common",
            Self::Plate => "plate",
        }
    }
}

/// A point that needs supporting, or that a strut terminates on.
///
/// Two support points are considered equal when their locations are
/// equal componentwise; the origin tag and normal do not participate.
/// The queue dedup and the router's merge bookkeeping rely on this.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SupportPoint {
    /// Position in world space.
    pub location: Point3<f64>,

    /// Provenance of the point.
    pub origin: PointOrigin,

    /// Unit surface normal for [`PointOrigin::Model`] points.
    ///
    /// Unused for common and plate points, conventionally zero there.
    pub normal: Vector3<f64>,
}

impl SupportPoint {
    /// Create a model-surface point with its normal.
    #[inline]
    #[must_use]
    pub const fn model(location: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            location,
            origin: PointOrigin::Model,
            normal,
        }
    }

    /// Create an interior junction point.
    #[inline]
    #[must_use]
    pub fn common(location: Point3<f64>) -> Self {
        Self {
            location,
            origin: PointOrigin::Common,
            normal: Vector3::zeros(),
        }
    }

    /// Create a build-plate point.
    #[inline]
    #[must_use]
    pub fn plate(location: Point3<f64>) -> Self {
        Self {
            location,
            origin: PointOrigin::Plate,
            normal: Vector3::zeros(),
        }
    }
}

impl PartialEq for SupportPoint {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

/// A directed support edge: `upper` rests on `lower`.
///
/// The set of tree points forms a forest. Every upper appears as upper
/// in at most one edge; every lower is the plate, the model surface, or
/// itself the upper of further edges.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreePoint {
    /// The supported end (higher Z).
    pub upper: SupportPoint,
    /// The supporting end (lower Z).
    pub lower: SupportPoint,
}

impl TreePoint {
    /// Create a new directed support edge.
    #[inline]
    #[must_use]
    pub const fn new(upper: SupportPoint, lower: SupportPoint) -> Self {
        Self { upper, lower }
    }

    /// Length of the strut this edge will become.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.upper.location - self.lower.location).norm()
    }
}
