//! Strut meshing.
//!
//! Turns each tree edge into a triangulated strut: a triangular prism
//! whose ends are welded into the model surface or capped on the build
//! plate. Vertices are emitted per triangle (a soup); the result may be
//! non-manifold at junctions, which downstream slicers tolerate.

use nalgebra::{Point3, Vector3};
use support_mesh::TriMesh;
use tracing::debug;

use crate::geometry::{angle_between, rotate_around, unit_or_up};
use crate::params::{StrutRadiusModel, SupportParams};
use crate::progress::{Progress, Stage};
use crate::types::{PointOrigin, TreePoint};

/// Struts are never thinner than this.
const MIN_STRUT_RADIUS: f64 = 1.0;

/// Triangulate every tree edge into a support-only mesh.
///
/// Zero-length edges (a merge that degenerated onto one of its
/// operands) are skipped.
#[must_use]
pub fn mesh_struts(
    tree: &[TreePoint],
    params: &SupportParams,
    progress: &mut Progress<'_>,
) -> TriMesh {
    progress.begin(Stage::Mesh);

    // Up to 8 faces and 24 vertices per strut
    let mut mesh = TriMesh::with_capacity(tree.len() * 24, tree.len() * 8);

    for (index, edge) in tree.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        progress.report((100 * index / tree.len().max(1)) as u32);

        if edge.upper.location == edge.lower.location {
            continue;
        }
        add_strut(&mut mesh, edge, params);
    }

    debug!(
        struts = tree.len(),
        triangles = mesh.face_count(),
        "Meshed support struts"
    );
    progress.report(100);

    mesh
}

/// Radius for a strut, per the configured model.
///
/// The angle-scaled model multiplies by the tilt from vertical in
/// radians, substituting 1 for perfectly vertical struts.
fn strut_radius(edge: &TreePoint, params: &SupportParams) -> f64 {
    let axis = edge.upper.location - edge.lower.location;
    let length = axis.norm();

    let r = match params.radius_model {
        StrutRadiusModel::AngleScaled => {
            let tilt = angle_between(&axis, &Vector3::z()).unwrap_or(0.0);
            #[allow(clippy::float_cmp)] // exact zero means exactly vertical
            let factor = if tilt == 0.0 { 1.0 } else { tilt };
            params.diameter_coefficient * length * factor
        }
        StrutRadiusModel::Uniform => params.diameter_coefficient * length,
    };

    r.max(MIN_STRUT_RADIUS)
}

/// Emit the prism (or fan) for one tree edge.
fn add_strut(mesh: &mut TriMesh, edge: &TreePoint, params: &SupportParams) {
    let top = edge.upper.location;
    let bottom = edge.lower.location;
    let r = strut_radius(edge, params);

    let mut top_ring = [top; 3];
    let mut bottom_ring = [bottom; 3];

    for i in 0..3 {
        #[allow(clippy::cast_precision_loss)]
        let step = i as f64 * 2.0 * std::f64::consts::PI / 3.0;
        let spoke = rotate_around(Vector3::new(r, 0.0, 0.0), Vector3::z(), step);
        top_ring[i] = top + spoke;

        if edge.lower.origin == PointOrigin::Model {
            // Base triangle tilted into the anchor surface
            bottom_ring[i] = bottom + anchor_spoke(edge.lower.normal, r, step);
        } else {
            bottom_ring[i] = bottom + spoke;
        }
    }

    let [t0, t1, t2] = top_ring;
    let [b0, b1, b2] = bottom_ring;

    if edge.upper.origin == PointOrigin::Model {
        // Weld the upper end into the model: a fan from the contact
        // point to the lower triangle, no upper ring
        add_face(mesh, top, b0, b1);
        add_face(mesh, top, b1, b2);
        add_face(mesh, top, b2, b0);
        return;
    }

    add_face(mesh, t0, t1, t2);

    if edge.lower.origin == PointOrigin::Model {
        add_face(mesh, t0, b1, b2);
        add_face(mesh, t0, b2, t1);
        add_face(mesh, t1, b2, b0);
        add_face(mesh, t1, b0, t2);
        add_face(mesh, t2, b0, b1);
        add_face(mesh, t2, b1, t0);
    } else {
        add_face(mesh, t0, b0, b1);
        add_face(mesh, t0, b1, t1);
        add_face(mesh, t1, b1, b2);
        add_face(mesh, t1, b2, t2);
        add_face(mesh, t2, b2, b0);
        add_face(mesh, t2, b0, t0);

        if edge.lower.origin == PointOrigin::Plate {
            add_face(mesh, b2, b1, b0);
        }
    }
}

/// A spoke of radius `r` in the plane perpendicular to an anchor
/// normal, rotated `step` radians around it.
fn anchor_spoke(normal: Vector3<f64>, r: f64, step: f64) -> Vector3<f64> {
    let n = unit_or_up(normal);

    // Any reference not parallel to the normal works
    let reference = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let perp = (n * r).cross(&reference);
    let spoke = perp * (r / perp.norm());

    rotate_around(spoke, n, step)
}

/// Append a free-standing triangle: three fresh vertices, one face.
#[allow(clippy::cast_possible_truncation)]
// Vertex indices fit u32 by the mesh representation
fn add_face(mesh: &mut TriMesh, v1: Point3<f64>, v2: Point3<f64>, v3: Point3<f64>) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices.push(v1);
    mesh.vertices.push(v2);
    mesh.vertices.push(v3);
    mesh.faces.push([base, base + 1, base + 2]);
}
