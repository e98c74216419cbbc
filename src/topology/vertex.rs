use crate::math::Point3;

use super::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in a mesh.
    pub struct VertexId;
}

/// Position of a vertex relative to the other operand of a boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VertexStatus {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// On the intersection curve of the two solids.
    Boundary,
}

/// Exact coordinate key used to deduplicate vertices.
///
/// Built from the bit patterns of the snapped coordinates, so two keys are
/// equal iff the coordinates are bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey([u64; 3]);

impl VertexKey {
    /// Key of an already snapped position.
    #[must_use]
    pub fn of(position: &Point3) -> Self {
        Self([
            position.x.to_bits(),
            position.y.to_bits(),
            position.z.to_bits(),
        ])
    }
}

/// Flushes coordinates within `eps` of zero (and `-0.0`) to `+0.0`.
#[must_use]
pub fn snap(position: &Point3, eps: f64) -> Point3 {
    position.map(|c| if c.abs() < eps { 0.0 } else { c })
}

/// Data associated with a mesh vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    position: Point3,
    status: VertexStatus,
    /// Live faces using this vertex.
    members: Vec<FaceId>,
}

impl Vertex {
    #[must_use]
    pub fn new(position: Point3, status: VertexStatus) -> Self {
        Self {
            position,
            status,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn position(&self) -> &Point3 {
        &self.position
    }

    #[must_use]
    pub fn status(&self) -> VertexStatus {
        self.status
    }

    pub fn set_status(&mut self, status: VertexStatus) {
        self.status = status;
    }

    /// Faces this vertex belongs to.
    #[must_use]
    pub fn members(&self) -> &[FaceId] {
        &self.members
    }

    /// Whether this vertex is a corner of `face`.
    #[must_use]
    pub fn is_member(&self, face: FaceId) -> bool {
        self.members.contains(&face)
    }

    pub(crate) fn attach(&mut self, face: FaceId) {
        if !self.members.contains(&face) {
            self.members.push(face);
        }
    }

    pub(crate) fn detach(&mut self, face: FaceId) {
        self.members.retain(|&f| f != face);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_unifies_signed_zero() {
        let a = snap(&Point3::new(-0.0, 1e-12, 2.0), 1e-8);
        let b = snap(&Point3::new(0.0, 0.0, 2.0), 1e-8);
        assert_eq!(VertexKey::of(&a), VertexKey::of(&b));
    }

    #[test]
    fn keys_are_exact() {
        let a = Point3::new(0.1 + 0.2, 0.0, 0.0);
        let b = Point3::new(0.3, 0.0, 0.0);
        assert_ne!(VertexKey::of(&a), VertexKey::of(&b));
    }
}
