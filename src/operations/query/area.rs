use crate::topology::Solid;

/// Computes the total surface area of a solid as the sum of its triangle
/// areas.
pub struct SurfaceArea<'a> {
    solid: &'a Solid,
}

impl<'a> SurfaceArea<'a> {
    /// Creates a new `SurfaceArea` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the total surface area.
    #[must_use]
    pub fn execute(&self) -> f64 {
        self.solid.mesh().faces().map(|(_, face)| face.area()).sum()
    }
}
