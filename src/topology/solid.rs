use std::fmt;

use crate::error::{GeometryError, Result, TopologyError};
use crate::math::{Bound, Matrix4, Point3, Vector3};
use crate::operations::boolean::{Construct, CsgParams, Difference, Intersection, Union};
use crate::tessellation::RenderBuffers;

use super::{FaceId, Mesh};

/// How a boolean result was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub construct: Construct,
    /// Name of the left operand.
    pub left: String,
    /// Name of the right operand.
    pub right: String,
}

/// A closed triangle mesh taking part in boolean composition.
///
/// Owns its [`Mesh`]; booleans never mutate their operands. The shadow
/// stack ([`Solid::push`] / [`Solid::pop`]) saves one snapshot of the mesh
/// so a caller can edit a solid and roll the edit back.
#[derive(Debug, Clone)]
pub struct Solid {
    name: String,
    mesh: Mesh,
    shadow: Option<Box<Mesh>>,
    params: CsgParams,
    provenance: Option<Provenance>,
}

impl Solid {
    /// Creates an empty solid with default parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: Mesh::new(),
            shadow: None,
            params: CsgParams::default(),
            provenance: None,
        }
    }

    /// Sets the parameters used when this solid is the left operand.
    #[must_use]
    pub fn with_params(mut self, params: CsgParams) -> Self {
        self.params = params;
        self
    }

    pub(crate) fn from_parts(
        name: String,
        mesh: Mesh,
        params: CsgParams,
        provenance: Provenance,
    ) -> Self {
        Self {
            name,
            mesh,
            shadow: None,
            params,
            provenance: Some(provenance),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &CsgParams {
        &self.params
    }

    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Construct and operand names, for boolean results.
    #[must_use]
    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    /// Adds the triangle `(a, b, c)`; the outward normal follows the
    /// right-hand rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle is degenerate.
    pub fn add_face(&mut self, a: Point3, b: Point3, c: Point3) -> Result<FaceId> {
        self.mesh.add_triangle([a, b, c], self.params.eps)
    }

    /// Adds a triangle, reordering its corners so the winding agrees with
    /// `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle is degenerate.
    pub fn add_face_with_normal(
        &mut self,
        a: Point3,
        b: Point3,
        c: Point3,
        normal: &Vector3,
    ) -> Result<FaceId> {
        if (b - a).cross(&(c - a)).dot(normal) < 0.0 {
            self.add_face(a, c, b)
        } else {
            self.add_face(a, b, c)
        }
    }

    /// Adds a triangle from 9 packed coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle is degenerate.
    pub fn add_coords(&mut self, coords: &[f64; 9]) -> Result<FaceId> {
        let corner = |i: usize| Point3::new(coords[i], coords[i + 1], coords[i + 2]);
        self.add_face(corner(0), corner(3), corner(6))
    }

    /// Adds a triangle soup of 9 coordinates per face. Returns the number
    /// of faces added.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidCoordinates`] if the length is not a
    /// multiple of 9, or an error for the first degenerate triangle.
    pub fn add_triangles(&mut self, coords: &[f64]) -> Result<usize> {
        if !coords.len().is_multiple_of(9) {
            return Err(TopologyError::InvalidCoordinates(coords.len()).into());
        }
        let mut added = 0;
        for chunk in coords.chunks_exact(9) {
            let mut packed = [0.0; 9];
            packed.copy_from_slice(chunk);
            self.add_coords(&packed)?;
            added += 1;
        }
        Ok(added)
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Bound of all faces; the origin box for an empty solid.
    #[must_use]
    pub fn bound(&self) -> Bound {
        self.mesh.bound().unwrap_or_default()
    }

    /// Flips every face inside out.
    pub fn invert(&mut self) {
        for id in self.mesh.face_ids() {
            if let Ok(face) = self.mesh.face_mut(id) {
                face.invert();
            }
        }
    }

    /// Maps every vertex through `matrix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses a face; the solid is
    /// left unchanged in that case.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        self.mesh = self.mesh.transformed(matrix, self.params.eps)?;
        Ok(())
    }

    /// Flattened vertex and normal buffers, three vertices per face.
    #[must_use]
    pub fn compile(&self) -> RenderBuffers {
        RenderBuffers::from_mesh(&self.mesh)
    }

    /// Like [`Solid::compile`] with every position mapped through `matrix`
    /// and normals through its inverse transpose.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if `matrix` is singular.
    pub fn compile_transformed(&self, matrix: &Matrix4) -> Result<RenderBuffers> {
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .ok_or_else(|| GeometryError::Degenerate("singular transform".into()))?
            .transpose();
        Ok(RenderBuffers::from_mesh_transformed(
            &self.mesh,
            matrix,
            &normal_matrix,
        ))
    }

    /// Saves a snapshot of the mesh.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ShadowInUse`] if a snapshot is already held.
    pub fn push(&mut self) -> Result<()> {
        if self.shadow.is_some() {
            return Err(TopologyError::ShadowInUse.into());
        }
        self.shadow = Some(Box::new(self.mesh.clone()));
        Ok(())
    }

    /// Restores the snapshot saved by [`Solid::push`].
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NoShadow`] if no snapshot is held.
    pub fn pop(&mut self) -> Result<()> {
        let shadow = self.shadow.take().ok_or(TopologyError::NoShadow)?;
        self.mesh = *shadow;
        Ok(())
    }

    /// Boolean union with `other`.
    ///
    /// # Errors
    ///
    /// See [`Union::execute`].
    pub fn union(&self, other: &Solid) -> Result<Solid> {
        Union::new(self, other).execute()
    }

    /// Boolean intersection with `other`.
    ///
    /// # Errors
    ///
    /// See [`Intersection::execute`].
    pub fn intersection(&self, other: &Solid) -> Result<Solid> {
        Intersection::new(self, other).execute()
    }

    /// Boolean difference `self - other`.
    ///
    /// # Errors
    ///
    /// See [`Difference::execute`].
    pub fn difference(&self, other: &Solid) -> Result<Solid> {
        Difference::new(self, other).execute()
    }
}

impl fmt::Display for Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} faces, {} vertices, bound {}",
            self.name,
            self.face_count(),
            self.vertex_count(),
            self.bound()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CsgError;
    use crate::test_support::unit_box;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn normal_hint_reorders_corners() {
        let mut solid = Solid::new("hint");
        let id = solid
            .add_face_with_normal(
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                &Vector3::new(0.0, 0.0, -1.0),
            )
            .unwrap();
        let face = solid.mesh().face(id).unwrap();
        assert!(face.normal().z < 0.0);
    }

    #[test]
    fn soup_ingestion_counts_faces() {
        let mut solid = Solid::new("soup");
        let added = solid
            .add_triangles(&[
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(solid.vertex_count(), 4);

        let err = solid.add_triangles(&[0.0; 10]).unwrap_err();
        assert!(matches!(
            err,
            CsgError::Topology(TopologyError::InvalidCoordinates(10))
        ));
    }

    #[test]
    fn push_pop_round_trip() {
        let mut solid = unit_box("box", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let before = solid.bound();
        solid.push().unwrap();
        solid
            .transform(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(solid.bound().min_x(), 5.0);
        solid.pop().unwrap();
        assert_eq!(solid.bound(), before);
    }

    #[test]
    fn shadow_misuse_is_an_error() {
        let mut solid = Solid::new("shadow");
        assert!(matches!(
            solid.pop(),
            Err(CsgError::Topology(TopologyError::NoShadow))
        ));
        solid.push().unwrap();
        assert!(matches!(
            solid.push(),
            Err(CsgError::Topology(TopologyError::ShadowInUse))
        ));
    }

    #[test]
    fn empty_solid_reports_origin_bound() {
        let solid = Solid::new("empty");
        assert_eq!(solid.bound(), Bound::default());
        assert_eq!(solid.face_count(), 0);
    }

    #[test]
    fn invert_flips_all_normals() {
        let mut solid = unit_box("box", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let before: Vec<Vector3> = solid.mesh().faces().map(|(_, f)| *f.normal()).collect();
        solid.invert();
        let after: Vec<Vector3> = solid.mesh().faces().map(|(_, f)| *f.normal()).collect();
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(*b, -a);
        }
    }

    #[test]
    fn singular_transform_cannot_compile() {
        let solid = unit_box("box", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert!(solid.compile_transformed(&Matrix4::zeros()).is_err());
    }

    #[test]
    fn display_summarises_solid() {
        let solid = unit_box("box", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert_eq!(
            solid.to_string(),
            "box: 12 faces, 8 vertices, bound [0, 1] x [0, 1] x [0, 1]"
        );
    }
}
