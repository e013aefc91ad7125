//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete vertex positions.
///
/// Utility type for geometric calculations; stores actual positions
/// rather than indices. Winding is counter-clockwise when viewed from
/// the front (normal points toward the viewer).
///
/// # Example
///
/// ```
/// use support_mesh::Triangle;
/// use nalgebra::Point3;
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((tri.area() - 0.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    ///
    /// The direction follows the right-hand rule with CCW winding; the
    /// magnitude equals twice the triangle's area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    ///
    /// Returns `None` for degenerate triangles (zero area).
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid (center of mass).
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
            (self.v0.z + self.v1.z + self.v2.z) / 3.0,
        )
    }

    /// Closest point on the triangle (including its boundary) to `p`.
    ///
    /// Closed-form region-split projection: the plane of the triangle is
    /// divided into seven regions (interior, three edges, three
    /// vertices) in the barycentric parameter space, and the clamped
    /// parameters of the region containing the projection give the
    /// result. As in Schneider & Eberly, *Geometric Tools for Computer
    /// Graphics*, section 10.3.2.
    ///
    /// Degenerate triangles still return a sensible point: the clamping
    /// collapses to the nearest vertex or edge.
    ///
    /// # Example
    ///
    /// ```
    /// use support_mesh::Triangle;
    /// use nalgebra::Point3;
    ///
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    /// );
    ///
    /// // Above the interior: straight down
    /// let q = tri.closest_point(Point3::new(0.5, 0.5, 3.0));
    /// assert!((q - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    ///
    /// // Beyond a vertex: clamps to the vertex
    /// let q = tri.closest_point(Point3::new(-1.0, -1.0, 0.0));
    /// assert!((q - Point3::new(0.0, 0.0, 0.0)).norm() < 1e-12);
    /// ```
    #[must_use]
    #[allow(clippy::many_single_char_names)] // the standard naming of the algorithm
    #[allow(clippy::similar_names)]
    pub fn closest_point(&self, p: Point3<f64>) -> Point3<f64> {
        let e0 = self.v1 - self.v0;
        let e1 = self.v2 - self.v0;
        let d = self.v0 - p;

        let a = e0.dot(&e0);
        let b = e0.dot(&e1);
        let c = e1.dot(&e1);
        let dd = e0.dot(&d);
        let e = e1.dot(&d);

        let det = a.mul_add(c, -(b * b));
        let mut s = b.mul_add(e, -(c * dd));
        let mut t = b.mul_add(dd, -(a * e));

        if s + t <= det {
            if s < 0.0 {
                if t < 0.0 {
                    // Region 4
                    if e < 0.0 {
                        s = 0.0;
                        t = if -e >= c { 1.0 } else { -e / c };
                    } else if dd < 0.0 {
                        t = 0.0;
                        s = if -dd >= a { 1.0 } else { -dd / a };
                    } else {
                        s = 0.0;
                        t = 0.0;
                    }
                } else {
                    // Region 3
                    s = 0.0;
                    t = if e >= 0.0 {
                        0.0
                    } else if -e >= c {
                        1.0
                    } else {
                        -e / c
                    };
                }
            } else if t < 0.0 {
                // Region 5
                t = 0.0;
                s = if dd >= 0.0 {
                    0.0
                } else if -dd >= a {
                    1.0
                } else {
                    -dd / a
                };
            } else {
                // Region 0
                let inv_det = 1.0 / det;
                s *= inv_det;
                t *= inv_det;
            }
        } else if s < 0.0 {
            // Region 2
            let tmp0 = b + dd;
            let tmp1 = c + e;
            if tmp1 > tmp0 {
                let numer = tmp1 - tmp0;
                let denom = a - 2.0 * b + c;
                s = if numer >= denom { 1.0 } else { numer / denom };
                t = 1.0 - s;
            } else {
                s = 0.0;
                t = if tmp1 <= 0.0 {
                    1.0
                } else if e >= 0.0 {
                    0.0
                } else {
                    -e / c
                };
            }
        } else if t < 0.0 {
            // Region 6
            let tmp0 = b + e;
            let tmp1 = a + dd;
            if tmp1 > tmp0 {
                let numer = tmp1 - tmp0;
                let denom = c - 2.0 * b + a;
                t = if numer >= denom { 1.0 } else { numer / denom };
                s = 1.0 - t;
            } else {
                t = 0.0;
                s = if tmp1 <= 0.0 {
                    1.0
                } else if dd >= 0.0 {
                    0.0
                } else {
                    -dd / a
                };
            }
        } else {
            // Region 1
            let numer = c + e - b - dd;
            if numer <= 0.0 {
                s = 0.0;
            } else {
                let denom = a - 2.0 * b + c;
                s = if numer >= denom { 1.0 } else { numer / denom };
            }
            t = 1.0 - s;
        }

        self.v0 + e0 * s + e1 * t
    }
}
