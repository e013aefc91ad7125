//! Support generation result.

use support_mesh::TriMesh;

use crate::params::SupportParams;
use crate::types::TreePoint;

/// Everything the support pipeline produced.
#[derive(Debug, Clone)]
pub struct SupportResult {
    /// Triangulated support structure, as its own mesh.
    pub support_mesh: TriMesh,

    /// The routed forest of directed support edges.
    pub tree: Vec<TreePoint>,

    /// Number of sample points after deduplication.
    pub sample_count: usize,

    /// Number of faces flagged as overhanging.
    pub flagged_faces: usize,

    /// Number of ridge edges flagged.
    pub flagged_edges: usize,

    /// Number of lone minimum vertices flagged.
    pub flagged_vertices: usize,

    /// Parameters the supports were generated with.
    pub params: SupportParams,
}

impl SupportResult {
    /// An empty result, as produced for an empty input mesh.
    #[must_use]
    pub fn empty(params: SupportParams) -> Self {
        Self {
            support_mesh: TriMesh::new(),
            tree: Vec::new(),
            sample_count: 0,
            flagged_faces: 0,
            flagged_edges: 0,
            flagged_vertices: 0,
            params,
        }
    }

    /// Check whether no support geometry was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.support_mesh.is_empty()
    }

    /// Number of routed support edges.
    #[must_use]
    pub fn strut_count(&self) -> usize {
        self.tree.len()
    }

    /// The part with the supports appended as a second connected
    /// component, ready for export.
    #[must_use]
    pub fn merged_with(&self, part: &TriMesh) -> TriMesh {
        let mut combined = part.clone();
        combined.merge(&self.support_mesh);
        combined
    }
}

impl std::fmt::Display for SupportResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SupportResult: {} samples, {} struts, {} triangles",
            self.sample_count,
            self.strut_count(),
            self.support_mesh.face_count()
        )
    }
}
