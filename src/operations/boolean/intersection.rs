use crate::error::Result;
use crate::topology::Solid;

use super::engine::boolean_execute;
use super::select::Construct;

/// Computes the boolean intersection of two solids.
pub struct Intersection<'a> {
    left: &'a Solid,
    right: &'a Solid,
}

impl<'a> Intersection<'a> {
    /// Creates a new `Intersection` operation.
    #[must_use]
    pub fn new(left: &'a Solid, right: &'a Solid) -> Self {
        Self { left, right }
    }

    /// Executes the intersection, returning a new solid. Solids that do not
    /// overlap give an empty result.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerances of the left operand are invalid,
    /// splitting runs away, or a face cannot be classified.
    pub fn execute(&self) -> Result<Solid> {
        boolean_execute(self.left, self.right, Construct::Intersection)
    }
}
