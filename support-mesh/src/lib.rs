//! Triangle-mesh substrate for tree-support generation.
//!
//! This crate provides the read-only mesh view the support generator
//! works against:
//!
//! - [`TriMesh`] - an indexed triangle mesh with computed normals
//! - [`Triangle`] - a concrete triangle with closest-point projection
//! - [`VertexAdjacency`] - vertex-ring and edge-to-face lookups
//!
//! # Coordinate System
//!
//! Right-handed, +Z is the build direction. The build plate is the
//! plane `Z = min_z` of the part. Faces use counter-clockwise winding
//! when viewed from outside, so normals point outward by the right-hand
//! rule.
//!
//! # Units
//!
//! Unit-agnostic; all coordinates are `f64`. Downstream crates assume
//! millimeters.
//!
//! # Example
//!
//! ```
//! use support_mesh::TriMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = TriMesh::new();
//! mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod mesh;
mod triangle;

pub use adjacency::VertexAdjacency;
pub use mesh::{unit_cube, TriMesh};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
