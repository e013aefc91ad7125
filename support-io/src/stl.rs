//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL. The loader sniffs the format:
//! ASCII files start with `solid` and contain no null bytes in what
//! would be the binary header; everything else is treated as binary.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]     - Header (ignored)
//! UINT32        - Number of triangles
//! foreach triangle
//!     REAL32[3] - Normal vector
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count (written as 0)
//! end
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use support_mesh::{Point3, TriMesh};

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL.
const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file, auto-detecting ASCII vs binary.
///
/// The returned mesh has three vertices per facet (no welding).
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid STL.
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<TriMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    if looks_ascii(&bytes) {
        let text = String::from_utf8_lossy(&bytes);
        parse_ascii(&text)
    } else {
        parse_binary(&bytes)
    }
}

/// Save a mesh as binary STL.
///
/// Facet normals are recomputed from the vertex positions; degenerate
/// facets get a zero normal, which slicers accept.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_stl<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_stl(mesh, BufWriter::new(file))
}

/// Write a mesh as binary STL to an arbitrary writer.
///
/// # Errors
///
/// Returns an error if the writer fails.
#[allow(clippy::cast_possible_truncation)]
// Face counts beyond u32 are not representable in STL
pub fn write_stl<W: Write>(mesh: &TriMesh, mut writer: W) -> IoResult<()> {
    let mut header = [0u8; HEADER_SIZE];
    let tag = b"support-mesh binary STL";
    header[..tag.len()].copy_from_slice(tag);
    writer.write_all(&header)?;
    writer.write_all(&(mesh.face_count() as u32).to_le_bytes())?;

    for tri in mesh.triangles() {
        let normal = tri.normal().unwrap_or_default();
        write_vector(&mut writer, normal.x, normal.y, normal.z)?;
        for v in [tri.v0, tri.v1, tri.v2] {
            write_vector(&mut writer, v.x, v.y, v.z)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
// STL is a 32-bit float format
fn write_vector<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> IoResult<()> {
    writer.write_all(&(x as f32).to_le_bytes())?;
    writer.write_all(&(y as f32).to_le_bytes())?;
    writer.write_all(&(z as f32).to_le_bytes())?;
    Ok(())
}

/// ASCII files start with "solid"; binary files that happen to share
/// the prefix betray themselves with null bytes in the header.
fn looks_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let text = String::from_utf8_lossy(head);
    text.trim_start().starts_with("solid") && !head.contains(&0)
}

fn parse_binary(bytes: &[u8]) -> IoResult<TriMesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::invalid_content("file too small to be binary STL"));
    }

    let face_count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let mut mesh = TriMesh::with_capacity(face_count as usize * 3, face_count as usize);
    let mut offset = HEADER_SIZE + 4;

    for i in 0..face_count {
        if bytes.len() < offset + TRIANGLE_SIZE {
            return Err(IoError::UnexpectedEof {
                expected: face_count,
                got: i,
            });
        }

        // Skip the stored normal (12 bytes); it is often wrong anyway
        let record = &bytes[offset..offset + TRIANGLE_SIZE];
        push_facet(
            &mut mesh,
            read_point(&record[12..24]),
            read_point(&record[24..36]),
            read_point(&record[36..48]),
        );
        offset += TRIANGLE_SIZE;
    }

    Ok(mesh)
}

fn read_point(bytes: &[u8]) -> Point3<f64> {
    let coord = |i: usize| {
        f64::from(f32::from_le_bytes([
            bytes[i],
            bytes[i + 1],
            bytes[i + 2],
            bytes[i + 3],
        ]))
    };
    Point3::new(coord(0), coord(4), coord(8))
}

fn parse_ascii(text: &str) -> IoResult<TriMesh> {
    let mut mesh = TriMesh::new();
    let mut pending: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("vertex") {
            continue;
        }

        let mut coord = || -> IoResult<f64> {
            tokens
                .next()
                .ok_or_else(|| IoError::invalid_content("vertex with fewer than 3 coordinates"))?
                .parse::<f64>()
                .map_err(IoError::from)
        };
        pending.push(Point3::new(coord()?, coord()?, coord()?));

        if pending.len() == 3 {
            push_facet(&mut mesh, pending[0], pending[1], pending[2]);
            pending.clear();
        }
    }

    if !pending.is_empty() {
        return Err(IoError::invalid_content(
            "facet with fewer than 3 vertices at end of file",
        ));
    }

    Ok(mesh)
}

#[allow(clippy::cast_possible_truncation)]
// Vertex indices fit u32 by the mesh representation
fn push_facet(mesh: &mut TriMesh, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices.push(v0);
    mesh.vertices.push(v1);
    mesh.vertices.push(v2);
    mesh.faces.push([base, base + 1, base + 2]);
}
