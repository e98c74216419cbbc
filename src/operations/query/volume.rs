use crate::topology::Solid;

/// Computes the volume enclosed by a solid.
///
/// Uses the signed tetrahedron method: for each triangle, computes
/// `(1/6) * v0 . (v1 x v2)` and sums over all triangles. The sum is
/// positive for a closed mesh with outward-facing normals; an inverted
/// solid gives a negative volume.
pub struct Volume<'a> {
    solid: &'a Solid,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the signed volume.
    #[must_use]
    pub fn execute(&self) -> f64 {
        self.solid
            .mesh()
            .faces()
            .map(|(_, face)| {
                let [v0, v1, v2] = face.corners();
                v0.coords.dot(&v1.coords.cross(&v2.coords))
            })
            .sum::<f64>()
            / 6.0
    }
}
