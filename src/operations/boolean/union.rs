use crate::error::Result;
use crate::topology::Solid;

use super::engine::boolean_execute;
use super::select::Construct;

/// Computes the boolean union of two solids.
pub struct Union<'a> {
    left: &'a Solid,
    right: &'a Solid,
}

impl<'a> Union<'a> {
    /// Creates a new `Union` operation.
    #[must_use]
    pub fn new(left: &'a Solid, right: &'a Solid) -> Self {
        Self { left, right }
    }

    /// Executes the union, returning a new solid. Both operands are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerances of the left operand are invalid,
    /// splitting runs away, or a face cannot be classified.
    pub fn execute(&self) -> Result<Solid> {
        boolean_execute(self.left, self.right, Construct::Union)
    }
}
