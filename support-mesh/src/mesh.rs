//! Indexed triangle mesh.

use crate::Triangle;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Stores vertex positions and faces separately, with faces referencing
/// vertices by index. The support generator treats the part mesh as
/// read-only; normals are computed on demand rather than cached.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from
/// outside, so face normals point outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use support_mesh::TriMesh;
/// use nalgebra::Point3;
///
/// let mesh = TriMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Get the number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces (triangles).
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no usable geometry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Get a triangle by face index with resolved vertex positions.
    ///
    /// Returns `None` if the face index is out of bounds.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<Triangle> {
        self.faces.get(face_index).map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize],
            v1: self.vertices[i1 as usize],
            v2: self.vertices[i2 as usize],
        })
    }

    /// Iterate over all triangles with resolved vertex positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize],
            v1: self.vertices[i1 as usize],
            v2: self.vertices[i2 as usize],
        })
    }

    /// Compute the unit normal of a face.
    ///
    /// Returns `None` if the face index is out of bounds or the
    /// triangle is degenerate (zero area).
    #[must_use]
    pub fn face_normal(&self, face_index: usize) -> Option<Vector3<f64>> {
        self.triangle(face_index).and_then(|tri| tri.normal())
    }

    /// Compute per-vertex normals as the area-weighted average of
    /// incident face normals.
    ///
    /// The unnormalized cross product of each face carries twice the
    /// face area, which provides the weighting. Vertices with no
    /// incident non-degenerate face get the zero vector; callers decide
    /// what an undefined normal means (the support router substitutes
    /// +Z).
    ///
    /// # Example
    ///
    /// ```
    /// use support_mesh::unit_cube;
    ///
    /// let cube = unit_cube();
    /// let normals = cube.vertex_normals();
    /// assert_eq!(normals.len(), cube.vertex_count());
    /// // Corner normals of a cube point diagonally outward
    /// assert!(normals[0].z < 0.0);
    /// ```
    #[must_use]
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut accumulated = vec![Vector3::zeros(); self.vertices.len()];

        for &[i0, i1, i2] in &self.faces {
            let v0 = self.vertices[i0 as usize];
            let v1 = self.vertices[i1 as usize];
            let v2 = self.vertices[i2 as usize];
            let weighted = (v1 - v0).cross(&(v2 - v0));

            accumulated[i0 as usize] += weighted;
            accumulated[i1 as usize] += weighted;
            accumulated[i2 as usize] += weighted;
        }

        for normal in &mut accumulated {
            let len = normal.norm();
            if len > f64::EPSILON {
                *normal /= len;
            } else {
                *normal = Vector3::zeros();
            }
        }

        accumulated
    }

    /// The minimum Z coordinate over all vertices.
    ///
    /// This is the build-plate plane for a part resting on the plate.
    /// Returns `None` for a mesh with no vertices.
    #[must_use]
    pub fn min_z(&self) -> Option<f64> {
        self.vertices
            .iter()
            .map(|v| v.z)
            .fold(None, |acc, z| match acc {
                None => Some(z),
                Some(m) => Some(m.min(z)),
            })
    }

    /// Translate the mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Merge another mesh into this one.
    ///
    /// The other mesh's vertices and faces are appended, with face
    /// indices shifted so they keep referring to the appended vertices.
    /// This is how a support mesh becomes the second connected
    /// component of an exported part.
    #[allow(clippy::cast_possible_truncation)]
    // Mesh indices are u32; vertex counts beyond 4B are unsupported by design
    pub fn merge(&mut self, other: &Self) {
        let vertex_offset = self.vertices.len() as u32;

        self.vertices.extend(other.vertices.iter().copied());

        for face in &other.faces {
            self.faces.push([
                face[0] + vertex_offset,
                face[1] + vertex_offset,
                face[2] + vertex_offset,
            ]);
        }
    }
}

/// Helper function to create a unit cube mesh.
///
/// Creates a cube from (0,0,0) to (1,1,1) with outward-facing normals.
///
/// # Example
///
/// ```
/// use support_mesh::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> TriMesh {
    let mut mesh = TriMesh::with_capacity(8, 12);

    mesh.vertices.push(Point3::new(0.0, 0.0, 0.0)); // 0
    mesh.vertices.push(Point3::new(1.0, 0.0, 0.0)); // 1
    mesh.vertices.push(Point3::new(1.0, 1.0, 0.0)); // 2
    mesh.vertices.push(Point3::new(0.0, 1.0, 0.0)); // 3
    mesh.vertices.push(Point3::new(0.0, 0.0, 1.0)); // 4
    mesh.vertices.push(Point3::new(1.0, 0.0, 1.0)); // 5
    mesh.vertices.push(Point3::new(1.0, 1.0, 1.0)); // 6
    mesh.vertices.push(Point3::new(0.0, 1.0, 1.0)); // 7

    // 12 triangles (2 per cube face), CCW winding viewed from outside

    // Bottom (z=0), normal -Z
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);

    // Top (z=1), normal +Z
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);

    // Front (y=0), normal -Y
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);

    // Back (y=1), normal +Y
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);

    // Left (x=0), normal -X
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);

    // Right (x=1), normal +X
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}
