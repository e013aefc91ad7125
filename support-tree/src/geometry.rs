//! Small vector helpers shared by the router and the strut mesher.

use nalgebra::{Point3, Vector3};

/// Denominator threshold below which two lines count as parallel.
pub(crate) const PARALLEL_EPS: f64 = 1e-7;

/// Rotate `v` around the unit axis `k` by `angle` radians.
///
/// Rodrigues' formula: `v·cosθ + (k × v)·sinθ + k·(k·v)·(1 − cosθ)`.
/// The axis must be unit length.
pub(crate) fn rotate_around(v: Vector3<f64>, k: Vector3<f64>, angle: f64) -> Vector3<f64> {
    let (sin, cos) = angle.sin_cos();
    v * cos + k.cross(&v) * sin + k * (k.dot(&v)) * (1.0 - cos)
}

/// Closest point on line `(ap, ad)` to line `(bp, bd)`.
///
/// Falls back to `ap` when the lines are (nearly) parallel.
pub(crate) fn intersect_lines(
    ap: Point3<f64>,
    ad: Vector3<f64>,
    bp: Point3<f64>,
    bd: Vector3<f64>,
) -> Point3<f64> {
    let a = ad.dot(&ad);
    let b = ad.dot(&bd);
    let c = bd.dot(&bd);
    let d = ad.dot(&(ap - bp));
    let e = bd.dot(&(ap - bp));

    let denom = a.mul_add(c, -(b * b));
    if denom < PARALLEL_EPS {
        return ap;
    }
    let s = b.mul_add(e, -(c * d)) / denom;
    ap + ad * s
}

/// Unit version of `n`, substituting +Z for undefined (zero) normals.
pub(crate) fn unit_or_up(n: Vector3<f64>) -> Vector3<f64> {
    let len = n.norm();
    if len < f64::EPSILON {
        Vector3::z()
    } else {
        n / len
    }
}

/// Angle between two vectors in radians.
///
/// Returns `None` when either vector is (nearly) zero length, where the
/// angle is undefined. Candidate filters in the router treat an
/// undefined angle as "does not qualify".
pub(crate) fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Option<f64> {
    let norms = v1.norm() * v2.norm();
    if norms < 1e-12 {
        return None;
    }
    Some((v1.dot(v2) / norms).clamp(-1.0, 1.0).acos())
}
