//! Overhang classification.
//!
//! Partitions the mesh into elements that cannot self-support when
//! printed bottom-up: faces looking too far below horizontal, vertices
//! that are strict local minima of Z, and horizontal "ridge" edges
//! where exactly two adjacent vertices share the local minimum.

use hashbrown::HashSet;
use nalgebra::Vector3;
use support_mesh::{TriMesh, VertexAdjacency};
use tracing::debug;

use crate::params::SupportParams;

/// Tolerance for treating two vertex heights as tied.
///
/// Ridge detection on exact float equality only ever fires for
/// axis-aligned synthetic input; the tolerance lets it fire on real
/// scans too.
const RIDGE_EPS: f64 = 1e-9;

/// Elements of the mesh that need support.
///
/// The three sets are disjoint in meaning: a flagged face overhangs as
/// a whole, a flagged vertex is an isolated low point, a ridge edge is
/// a pair of tied low points.
#[derive(Debug, Clone, Default)]
pub struct OverhangFlags {
    /// Indices of faces whose normal looks more than the angle limit
    /// below horizontal.
    pub faces: Vec<usize>,

    /// Local-minimum ridge edges as normalized `(min, max)` vertex
    /// index pairs, deduplicated.
    pub ridge_edges: Vec<(u32, u32)>,

    /// Vertices that are strict local minima with downward normals.
    pub vertices: Vec<u32>,
}

impl OverhangFlags {
    /// Check whether nothing was flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.ridge_edges.is_empty() && self.vertices.is_empty()
    }
}

/// Classify which mesh elements need support.
///
/// A face is flagged when the angle between its normal and +Z exceeds
/// `π/2 + angle_limit`; degenerate faces are skipped. A vertex is
/// flagged when every neighbour is strictly higher and its accumulated
/// normal points downward. When exactly one neighbour ties the vertex's
/// height and all others are strictly higher, the pair forms a ridge
/// edge instead; more than one tie flags nothing.
#[must_use]
pub fn classify_overhangs(
    mesh: &TriMesh,
    adjacency: &VertexAdjacency,
    vertex_normals: &[Vector3<f64>],
    params: &SupportParams,
) -> OverhangFlags {
    let mut flags = OverhangFlags::default();
    let up = Vector3::z();

    for face_index in 0..mesh.face_count() {
        let Some(normal) = mesh.face_normal(face_index) else {
            continue;
        };
        let angle = normal.dot(&up).clamp(-1.0, 1.0).acos();
        if angle - std::f64::consts::FRAC_PI_2 >= params.angle_limit {
            flags.faces.push(face_index);
        }
    }

    let mut seen_ridges: HashSet<(u32, u32)> = HashSet::new();

    #[allow(clippy::cast_possible_truncation)]
    // Vertex indices fit u32 by the mesh representation
    for v in 0..mesh.vertex_count() as u32 {
        let ring = adjacency.neighbors(v);
        if ring.is_empty() {
            continue;
        }

        let vz = mesh.vertices[v as usize].z;
        let mut has_lower = false;
        let mut tie = None;
        let mut tie_count = 0usize;

        for &n in ring {
            let nz = mesh.vertices[n as usize].z;
            if nz < vz - RIDGE_EPS {
                has_lower = true;
                break;
            }
            if (nz - vz).abs() <= RIDGE_EPS {
                tie = Some(n);
                tie_count += 1;
            }
        }

        if has_lower || vertex_normals[v as usize].z >= 0.0 {
            continue;
        }

        match (tie_count, tie) {
            (0, _) => flags.vertices.push(v),
            (1, Some(w)) => {
                let key = if v < w { (v, w) } else { (w, v) };
                if seen_ridges.insert(key) {
                    flags.ridge_edges.push(key);
                }
            }
            _ => {}
        }
    }

    debug!(
        faces = flags.faces.len(),
        ridges = flags.ridge_edges.len(),
        vertices = flags.vertices.len(),
        "Classified overhangs"
    );

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn classify(mesh: &TriMesh, params: &SupportParams) -> OverhangFlags {
        let adjacency = VertexAdjacency::build(&mesh.faces);
        let normals = mesh.vertex_normals();
        classify_overhangs(mesh, &adjacency, &normals, params)
    }

    /// Four faces hanging from a square rim down to an apex below.
    fn inverted_pyramid() -> TriMesh {
        TriMesh::from_parts(
            vec![
                Point3::new(-1.0, -1.0, 0.0), // 0
                Point3::new(1.0, -1.0, 0.0),  // 1
                Point3::new(1.0, 1.0, 0.0),   // 2
                Point3::new(-1.0, 1.0, 0.0),  // 3
                Point3::new(0.0, 0.0, -1.0),  // 4: apex, below the rim
            ],
            vec![[4, 1, 0], [4, 2, 1], [4, 3, 2], [4, 0, 3]],
        )
    }

    /// Two slopes meeting in a horizontal ridge below their rims.
    fn trough() -> TriMesh {
        TriMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, -1.0),  // 0: ridge
                Point3::new(1.0, 0.0, -1.0),  // 1: ridge
                Point3::new(0.0, 1.0, 0.0),   // 2
                Point3::new(1.0, 1.0, 0.0),   // 3
                Point3::new(0.0, -1.0, 0.0),  // 4
                Point3::new(1.0, -1.0, 0.0),  // 5
            ],
            vec![[0, 3, 1], [0, 2, 3], [0, 1, 5], [0, 5, 4]],
        )
    }

    #[test]
    fn flat_underside_is_flagged() {
        let cube = support_mesh::unit_cube();
        let flags = classify(&cube, &SupportParams::default());

        // Exactly the two bottom triangles look straight down
        assert_eq!(flags.faces.len(), 2);
        for &f in &flags.faces {
            let n = cube.face_normal(f).unwrap();
            assert!(n.z < -0.99);
        }
        // All 8 corners have a same-height or lower neighbor situation
        // that never produces a lone strict minimum
        assert!(flags.vertices.is_empty());
    }

    #[test]
    fn apex_vertex_is_flagged() {
        let mesh = inverted_pyramid();
        let flags = classify(&mesh, &SupportParams::default());
        assert_eq!(flags.vertices, vec![4]);
        assert!(flags.ridge_edges.is_empty());
    }

    #[test]
    fn ridge_edge_flagged_once() {
        let mesh = trough();
        let flags = classify(&mesh, &SupportParams::default());
        // Detected from both endpoints, deduplicated to one
        assert_eq!(flags.ridge_edges, vec![(0, 1)]);
        assert!(flags.vertices.is_empty());
    }

    #[test]
    fn slope_faces_respect_angle_limit() {
        let mesh = trough();

        // 45 degree slopes: under the default 60 degree limit
        let flags = classify(&mesh, &SupportParams::default());
        assert!(flags.faces.is_empty());

        // Tighten the limit below 45 degrees and they flag
        let tight = SupportParams::new().with_angle_limit_degrees(40.0);
        let flags = classify(&mesh, &tight);
        assert_eq!(flags.faces.len(), 4);
    }

    #[test]
    fn upward_normal_suppresses_vertex() {
        // Same apex-down shape but wound inside out, so normals point up
        let mut mesh = inverted_pyramid();
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        let flags = classify(&mesh, &SupportParams::default());
        assert!(flags.vertices.is_empty());
    }

    #[test]
    fn empty_mesh_flags_nothing() {
        let flags = classify(&TriMesh::new(), &SupportParams::default());
        assert!(flags.is_empty());
    }
}
