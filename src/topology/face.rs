use std::fmt;

use crate::error::Result;
use crate::math::{Bound, Plane, Point3, Vector3};

use super::{VertexId, VertexStatus};

slotmap::new_key_type! {
    /// Unique identifier for a face in a mesh.
    pub struct FaceId;
}

/// Position of a face relative to the other operand of a boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FaceStatus {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// Coplanar with a face of the other solid, normals agreeing.
    Same,
    /// Coplanar with a face of the other solid, normals opposed.
    Opposite,
    /// Touches the other solid edge-on.
    Boundary,
}

impl FaceStatus {
    /// Status implied for the corners of a face with this status.
    #[must_use]
    pub fn vertex_status(self) -> VertexStatus {
        match self {
            Self::Unknown => VertexStatus::Unknown,
            Self::Inside => VertexStatus::Inside,
            Self::Outside => VertexStatus::Outside,
            Self::Same | Self::Opposite | Self::Boundary => VertexStatus::Boundary,
        }
    }

    /// Face status a vertex status decides on its own, if any.
    #[must_use]
    pub fn from_vertex(status: VertexStatus) -> Option<Self> {
        match status {
            VertexStatus::Inside => Some(Self::Inside),
            VertexStatus::Outside => Some(Self::Outside),
            VertexStatus::Unknown | VertexStatus::Boundary => None,
        }
    }
}

/// Diagnostic name of a face: the index it was added under and the last
/// routine that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceName {
    pub index: usize,
    pub step: Option<&'static str>,
    pub generation: u32,
}

impl FaceName {
    #[must_use]
    pub fn input(index: usize) -> Self {
        Self {
            index,
            step: None,
            generation: 0,
        }
    }

    /// Name of a face produced from this one by `step`.
    #[must_use]
    pub fn derived(&self, step: &'static str) -> Self {
        Self {
            index: self.index,
            step: Some(step),
            generation: self.generation + 1,
        }
    }
}

impl fmt::Display for FaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "face {} ({step}, gen {})", self.index, self.generation),
            None => write!(f, "face {}", self.index),
        }
    }
}

/// A triangle of a mesh.
///
/// Corner positions are cached with the ids; vertices never move while a
/// face references them.
#[derive(Debug, Clone)]
pub struct Face {
    vertices: [VertexId; 3],
    corners: [Point3; 3],
    plane: Plane,
    bound: Bound,
    status: FaceStatus,
    alive: bool,
    name: FaceName,
    replaced_by: Vec<FaceId>,
}

impl Face {
    /// Creates a face over three vertices at the given positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle is degenerate.
    pub fn new(vertices: [VertexId; 3], corners: [Point3; 3], name: FaceName) -> Result<Self> {
        let plane = Plane::from_points(&corners[0], &corners[1], &corners[2])?;
        let bound = Bound::from_point(&corners[0])
            .union(&Bound::from_point(&corners[1]))
            .union(&Bound::from_point(&corners[2]));
        Ok(Self {
            vertices,
            corners,
            plane,
            bound,
            status: FaceStatus::Unknown,
            alive: true,
            name,
            replaced_by: Vec::new(),
        })
    }

    #[must_use]
    pub fn vertices(&self) -> &[VertexId; 3] {
        &self.vertices
    }

    #[must_use]
    pub fn corners(&self) -> &[Point3; 3] {
        &self.corners
    }

    #[must_use]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        self.plane.normal()
    }

    #[must_use]
    pub fn bound(&self) -> &Bound {
        &self.bound
    }

    #[must_use]
    pub fn status(&self) -> FaceStatus {
        self.status
    }

    pub fn set_status(&mut self, status: FaceStatus) {
        self.status = status;
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn name(&self) -> &FaceName {
        &self.name
    }

    /// Faces that replaced this one when it was split.
    #[must_use]
    pub fn replaced_by(&self) -> &[FaceId] {
        &self.replaced_by
    }

    pub(crate) fn retire(&mut self, replacements: Vec<FaceId>) {
        self.alive = false;
        self.replaced_by = replacements;
    }

    /// Reverses the winding (swaps `b` and `c`), flipping the normal.
    pub fn invert(&mut self) {
        self.vertices.swap(1, 2);
        self.corners.swap(1, 2);
        self.plane = self.plane.flipped();
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        let [a, b, c] = &self.corners;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        let [a, b, c] = &self.corners;
        (b - a).cross(&(c - a)).norm() * 0.5
    }

    /// Whether `point`, assumed on the face plane, lies inside the triangle
    /// or within `eps` of its edges.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, eps: f64) -> bool {
        let basis = self.plane.basis();
        let p = self.plane.project(point, &basis);
        let projected = self.corners.map(|c| self.plane.project(&c, &basis));
        (0..3).all(|i| {
            let a = projected[i];
            let b = projected[(i + 1) % 3];
            let edge = b - a;
            let len = edge.norm();
            len > 0.0 && edge.perp(&(p - a)) / len >= -eps
        })
    }

    /// Index (0..3) of `vertex` among the corners.
    #[must_use]
    pub fn corner_index(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }
}
