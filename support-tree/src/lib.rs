//! Branching tree-support generation for bottom-up FDM printing.
//!
//! Given a triangle mesh, this crate finds where printed material would
//! overhang unsupported, densifies the overhanging elements into sample
//! points, routes the samples into a branching forest of struts that
//! rest on the build plate, merge with one another, or terminate
//! against the part itself, and triangulates the forest into a
//! support-only mesh for export.
//!
//! The pipeline has four stages, each feeding the next:
//!
//! 1. **Classify** ([`classify_overhangs`]) - flag faces past the
//!    overhang angle limit, lone minimum vertices, and ridge edges.
//! 2. **Sample** ([`sample_support_points`]) - expand the flags into a
//!    deduplicated point cloud, sorted top-down.
//! 3. **Route** ([`route_tree`]) - greedily terminate every point
//!    against the plate, the model, or a merge junction, obeying the
//!    self-support cone.
//! 4. **Mesh** ([`mesh_struts`]) - instantiate each tree edge as a
//!    triangular prism strut.
//!
//! [`generate_supports`] runs all four. The transform is pure and
//! single-threaded; progress is surfaced through a [`Progress`]
//! callback.
//!
//! # Example
//!
//! ```
//! use support_mesh::unit_cube;
//! use support_tree::{generate_supports, Progress, SupportParams};
//!
//! // A cube resting on the plate self-supports everywhere: its only
//! // downward faces sit at plate height already.
//! let result = generate_supports(
//!     &unit_cube(),
//!     &SupportParams::default(),
//!     &mut Progress::none(),
//! )
//! .unwrap();
//!
//! assert!(result.is_empty());
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod geometry;
mod overhang;
mod params;
mod progress;
mod result;
mod router;
mod sample;
mod strut;
mod types;

pub use error::SupportError;
pub use overhang::{classify_overhangs, OverhangFlags};
pub use params::{StrutRadiusModel, SupportParams};
pub use progress::{Progress, Stage};
pub use result::SupportResult;
pub use router::route_tree;
pub use sample::sample_support_points;
pub use strut::mesh_struts;
pub use types::{PointOrigin, SupportPoint, TreePoint};

use support_mesh::{TriMesh, VertexAdjacency};
use tracing::info;

/// Run the full support pipeline on a part mesh.
///
/// The mesh is read-only; the result owns all produced geometry. An
/// empty mesh yields an empty result. Recompute from scratch after any
/// parameter change; there is no incremental update.
///
/// # Errors
///
/// Returns [`SupportError`] if the parameters fail validation. The
/// geometric transform itself cannot fail.
pub fn generate_supports(
    mesh: &TriMesh,
    params: &SupportParams,
    progress: &mut Progress<'_>,
) -> Result<SupportResult, SupportError> {
    params.validate()?;

    if mesh.is_empty() {
        return Ok(SupportResult::empty(params.clone()));
    }

    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Generating tree supports"
    );

    progress.begin(Stage::Classify);
    let adjacency = VertexAdjacency::build(&mesh.faces);
    let vertex_normals = mesh.vertex_normals();
    let flags = classify_overhangs(mesh, &adjacency, &vertex_normals, params);
    progress.report(100);

    let samples =
        sample_support_points(mesh, &adjacency, &vertex_normals, &flags, params, progress);
    let sample_count = samples.len();

    let tree = route_tree(mesh, samples, params, progress);
    let support_mesh = mesh_struts(&tree, params, progress);

    info!(
        samples = sample_count,
        struts = tree.len(),
        triangles = support_mesh.face_count(),
        "Support generation complete"
    );

    Ok(SupportResult {
        support_mesh,
        tree,
        sample_count,
        flagged_faces: flags.faces.len(),
        flagged_edges: flags.ridge_edges.len(),
        flagged_vertices: flags.vertices.len(),
        params: params.clone(),
    })
}
