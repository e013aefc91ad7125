//! Support-point sampling.
//!
//! Expands the overhang flags into a dense cloud of model-surface
//! points, sorted top-down for the router and deduplicated by location.

use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};
use support_mesh::{TriMesh, VertexAdjacency};
use tracing::debug;

use crate::overhang::OverhangFlags;
use crate::params::SupportParams;
use crate::progress::{Progress, Stage};
use crate::types::SupportPoint;

/// Turn the overhang flags into sorted, deduplicated sample points.
///
/// Flagged vertices sample themselves; ridge edges get `grid_density`
/// equally spaced points with the averaged normal of their two incident
/// faces; flagged faces get a triangular grid with `grid_density` rows.
/// The result is ordered by descending Z (descending X+Y on ties) and
/// contains no two points at the same location.
#[must_use]
pub fn sample_support_points(
    mesh: &TriMesh,
    adjacency: &VertexAdjacency,
    vertex_normals: &[Vector3<f64>],
    flags: &OverhangFlags,
    params: &SupportParams,
    progress: &mut Progress<'_>,
) -> Vec<SupportPoint> {
    progress.begin(Stage::Sample);

    let mut points = Vec::new();
    let total = flags.vertices.len() + flags.ridge_edges.len() + flags.faces.len();
    let mut done = 0usize;

    for &v in &flags.vertices {
        points.push(SupportPoint::model(
            mesh.vertices[v as usize],
            normal_or_up(vertex_normals[v as usize]),
        ));
        done += 1;
        report_fraction(progress, done, total);
    }

    for &(a, b) in &flags.ridge_edges {
        let normal = edge_normal(mesh, adjacency, a, b);
        sample_edge(
            &mut points,
            mesh.vertices[a as usize],
            mesh.vertices[b as usize],
            params.grid_density,
            normal,
        );
        done += 1;
        report_fraction(progress, done, total);
    }

    for &f in &flags.faces {
        sample_face(&mut points, mesh, f, params.grid_density);
        done += 1;
        report_fraction(progress, done, total);
    }

    sort_top_down(&mut points);
    dedup_by_location(&mut points);

    debug!(samples = points.len(), "Sampled support points");
    progress.report(100);

    points
}

#[allow(clippy::cast_possible_truncation)]
fn report_fraction(progress: &mut Progress<'_>, done: usize, total: usize) {
    if total > 0 {
        progress.report((100 * done / total) as u32);
    }
}

/// Emit `density` equally spaced points from `b` to `a`, endpoints
/// included.
fn sample_edge(
    out: &mut Vec<SupportPoint>,
    a: Point3<f64>,
    b: Point3<f64>,
    density: usize,
    normal: Vector3<f64>,
) {
    let v = a - b;
    #[allow(clippy::cast_precision_loss)]
    let step = v / (density - 1) as f64;
    for i in 0..density {
        #[allow(clippy::cast_precision_loss)]
        out.push(SupportPoint::model(b + step * i as f64, normal));
    }
}

/// Emit a triangular grid over a flagged face.
///
/// Rows run between the two edges leaving the face's second vertex,
/// shrinking from `density` points at the far edge down to the lone
/// apex.
fn sample_face(out: &mut Vec<SupportPoint>, mesh: &TriMesh, face_index: usize, density: usize) {
    let Some(tri) = mesh.triangle(face_index) else {
        return;
    };
    let Some(normal) = tri.normal() else {
        // Degenerate face: nothing to sample
        return;
    };

    let (a, b, c) = (tri.v0, tri.v1, tri.v2);
    let v1 = a - b;
    let v2 = c - b;

    #[allow(clippy::cast_precision_loss)]
    for i in (2..=density).rev() {
        let delta = (i - 1) as f64 / (density - 1) as f64;
        sample_edge(out, b + v1 * delta, b + v2 * delta, i, normal);
    }
    out.push(SupportPoint::model(b, normal));
}

/// Normal for a ridge edge: normalised sum of its incident face
/// normals, +Z when nothing usable is adjacent.
fn edge_normal(mesh: &TriMesh, adjacency: &VertexAdjacency, a: u32, b: u32) -> Vector3<f64> {
    let mut sum = Vector3::zeros();
    for &face in adjacency.faces_for_edge(a, b) {
        if let Some(n) = mesh.face_normal(face) {
            sum += n;
        }
    }
    normal_or_up(if sum.norm() > f64::EPSILON {
        sum.normalize()
    } else {
        Vector3::zeros()
    })
}

/// Substitute +Z for an undefined (zero) normal.
fn normal_or_up(n: Vector3<f64>) -> Vector3<f64> {
    if n.norm_squared() < f64::EPSILON {
        Vector3::z()
    } else {
        n
    }
}

/// Sort top-down: descending Z, then descending X+Y on ties.
pub(crate) fn sort_top_down(points: &mut [SupportPoint]) {
    points.sort_by(|p, q| {
        q.location
            .z
            .total_cmp(&p.location.z)
            .then_with(|| (q.location.x + q.location.y).total_cmp(&(p.location.x + p.location.y)))
    });
}

/// Drop points at locations already seen, keeping the first occurrence.
///
/// Bit-exact comparison; stronger than adjacent-only dedup, so equal
/// locations separated by a sort-key tie still collapse.
fn dedup_by_location(points: &mut Vec<SupportPoint>) {
    let mut seen: HashSet<(u64, u64, u64)> = HashSet::with_capacity(points.len());
    points.retain(|p| {
        seen.insert((
            p.location.x.to_bits(),
            p.location.y.to_bits(),
            p.location.z.to_bits(),
        ))
    });
}
