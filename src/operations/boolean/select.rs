use std::fmt;

use crate::topology::FaceStatus;

/// The kind of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Union,
    Intersection,
    Difference,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
        })
    }
}

/// Which operand a face comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The left operand, classified against the right one.
    This,
    /// The right operand, classified against the left one.
    That,
}

/// Whether a classified face goes into the result.
///
/// | Face from | Status   | Union | Intersection | Difference (A-B) |
/// |-----------|----------|-------|--------------|------------------|
/// | A         | Outside  | keep  | -            | keep             |
/// | A         | Inside   | -     | keep         | -                |
/// | A         | Same     | keep  | keep         | -                |
/// | A         | Opposite | -     | -            | keep             |
/// | B         | Outside  | keep  | -            | -                |
/// | B         | Inside   | -     | keep         | keep (inverted)  |
///
/// Coplanar faces of B are never kept: the matching face of A already
/// covers them. For a difference, B's inside faces are inverted before
/// composing.
#[must_use]
pub fn selects(construct: Construct, operand: Operand, status: FaceStatus) -> bool {
    matches!(
        (operand, construct, status),
        (Operand::This, Construct::Union, FaceStatus::Outside | FaceStatus::Same)
            | (Operand::This, Construct::Intersection, FaceStatus::Inside | FaceStatus::Same)
            | (Operand::This, Construct::Difference, FaceStatus::Outside | FaceStatus::Opposite)
            | (Operand::That, Construct::Union, FaceStatus::Outside)
            | (Operand::That, Construct::Intersection | Construct::Difference, FaceStatus::Inside)
    )
}
