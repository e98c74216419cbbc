mod ring;

pub use ring::triangulate_ring;

use crate::math::{Matrix3, Matrix4, Point3, Vector3};
use crate::topology::Mesh;

/// Flattened triangle buffers for a renderer.
///
/// `vertices` and `normals` are parallel arrays of packed `x, y, z` triples,
/// three per face in face order. Every corner of a face carries the face
/// normal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    /// Packed corner positions.
    pub vertices: Vec<f64>,
    /// Packed corner normals.
    pub normals: Vec<f64>,
}

impl RenderBuffers {
    /// Flattens the live faces of `mesh`.
    #[must_use]
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut buffers = Self::with_capacity(mesh.face_count());
        for (_, face) in mesh.faces() {
            for corner in face.corners() {
                buffers.push(corner, face.normal());
            }
        }
        buffers
    }

    /// Flattens the live faces of `mesh`, mapping positions through
    /// `matrix` and normals through `normal_matrix`.
    #[must_use]
    pub fn from_mesh_transformed(mesh: &Mesh, matrix: &Matrix4, normal_matrix: &Matrix3) -> Self {
        let mut buffers = Self::with_capacity(mesh.face_count());
        for (_, face) in mesh.faces() {
            let normal = (normal_matrix * face.normal()).normalize();
            for corner in face.corners() {
                buffers.push(&matrix.transform_point(corner), &normal);
            }
        }
        buffers
    }

    /// Number of triangles in the buffers.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 9
    }

    fn with_capacity(faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(faces * 9),
            normals: Vec::with_capacity(faces * 9),
        }
    }

    fn push(&mut self, position: &Point3, normal: &Vector3) {
        self.vertices.extend_from_slice(&[position.x, position.y, position.z]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
    }
}
