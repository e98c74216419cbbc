use crate::error::Result;
use crate::topology::Solid;

use super::engine::boolean_execute;
use super::select::Construct;

/// Computes the boolean difference of two solids (left minus right).
pub struct Difference<'a> {
    left: &'a Solid,
    right: &'a Solid,
}

impl<'a> Difference<'a> {
    /// Creates a new `Difference` operation.
    #[must_use]
    pub fn new(left: &'a Solid, right: &'a Solid) -> Self {
        Self { left, right }
    }

    /// Executes the difference, returning a new solid. The part of the
    /// right operand inside the left one is kept with flipped orientation
    /// so the result stays outward facing.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerances of the left operand are invalid,
    /// splitting runs away, or a face cannot be classified.
    pub fn execute(&self) -> Result<Solid> {
        boolean_execute(self.left, self.right, Construct::Difference)
    }
}
