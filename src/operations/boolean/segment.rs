use crate::error::{GeometryError, Result};
use crate::math::{Line, Point3, Sign};
use crate::topology::VertexKey;

/// What an end (or the interior) of a segment runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A corner of the triangle.
    Vertex,
    /// The inside of one triangle edge.
    Edge,
    /// The inside of the triangle.
    Face,
}

/// One end of a [`Segment`] or [`Cut`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoint {
    pub kind: SegmentKind,
    /// Parameter along the intersection line.
    pub distance: f64,
    pub position: Point3,
    /// Corner index for a vertex end; first corner of the crossed edge for
    /// an edge end. A point taken over from the other face keeps the corner
    /// of the end it replaced.
    pub corner: usize,
}

/// The part of an intersection line covered by one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: CutPoint,
    end: CutPoint,
    middle: SegmentKind,
}

impl Segment {
    /// Clips `line` to the triangle `corners`, given the signs of the corners
    /// against the other face's plane and their signed distances to it.
    ///
    /// The signs must not all be equal.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the signs do not describe a
    /// crossing.
    pub fn new(
        line: &Line,
        corners: &[Point3; 3],
        signs: [Sign; 3],
        distances: [f64; 3],
    ) -> Result<Self> {
        let mut ends: Vec<CutPoint> = Vec::with_capacity(2);
        let vertex = |i: usize| CutPoint {
            kind: SegmentKind::Vertex,
            distance: line.parameter_of(&corners[i]),
            position: corners[i],
            corner: i,
        };

        for i in 0..3 {
            if ends.len() < 2 && signs[i] == Sign::Zero {
                ends.push(vertex(i));
                if ends.len() < 2 && signs[(i + 1) % 3] == signs[(i + 2) % 3] {
                    ends.push(vertex(i));
                }
            }
        }

        for i in 0..3 {
            let j = (i + 1) % 3;
            let crosses = matches!(
                (signs[i], signs[j]),
                (Sign::Positive, Sign::Negative) | (Sign::Negative, Sign::Positive)
            );
            if ends.len() < 2 && crosses {
                let position = edge_crossing(corners, distances, i, j);
                ends.push(CutPoint {
                    kind: SegmentKind::Edge,
                    distance: line.parameter_of(&position),
                    position,
                    corner: i,
                });
            }
        }

        let [mut start, mut end] = ends[..] else {
            return Err(GeometryError::Degenerate(format!(
                "signs {signs:?} do not cross the triangle"
            ))
            .into());
        };
        let middle = match (start.kind, end.kind) {
            (SegmentKind::Vertex, SegmentKind::Vertex) if start.corner == end.corner => {
                SegmentKind::Vertex
            }
            (SegmentKind::Vertex, SegmentKind::Vertex) => SegmentKind::Edge,
            _ => SegmentKind::Face,
        };
        if start.distance > end.distance {
            std::mem::swap(&mut start, &mut end);
        }
        Ok(Self { start, end, middle })
    }

    #[must_use]
    pub fn start(&self) -> &CutPoint {
        &self.start
    }

    #[must_use]
    pub fn end(&self) -> &CutPoint {
        &self.end
    }

    #[must_use]
    pub fn middle(&self) -> SegmentKind {
        self.middle
    }

    /// Whether the parameter intervals of two segments on the same line
    /// overlap by more than `eps`.
    #[must_use]
    pub fn intersects(&self, other: &Segment, eps: f64) -> bool {
        !(self.end.distance < other.start.distance + eps
            || other.end.distance < self.start.distance + eps)
    }
}

/// Where edge `i -> j` crosses the cutting plane.
///
/// Interpolates from the endpoint with the smaller coordinate key, so two
/// faces sharing the edge compute bit-identical points.
fn edge_crossing(corners: &[Point3; 3], distances: [f64; 3], i: usize, j: usize) -> Point3 {
    let (lo, hi) = if VertexKey::of(&corners[i]) <= VertexKey::of(&corners[j]) {
        (i, j)
    } else {
        (j, i)
    };
    let t = distances[lo] / (distances[lo] - distances[hi]);
    corners[lo] + (corners[hi] - corners[lo]) * t
}

/// The part of a face that a face of the other solid actually cuts: the
/// overlap of the two segments, typed from this face's point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    pub start: CutPoint,
    pub end: CutPoint,
    pub middle: SegmentKind,
}

impl Cut {
    /// Overlap of `this` (on the face being split) with `that`. An end of
    /// `that` lying strictly inside `this` replaces the end of `this` and
    /// takes the type of this segment's interior. On a tie the end of
    /// `this` wins, being the more specific type.
    #[must_use]
    pub fn resolve(this: &Segment, that: &Segment, eps: f64) -> Self {
        let start = if that.start.distance > this.start.distance + eps {
            CutPoint {
                kind: this.middle,
                corner: this.start.corner,
                ..that.start
            }
        } else {
            this.start
        };
        let end = if that.end.distance < this.end.distance - eps {
            CutPoint {
                kind: this.middle,
                corner: this.end.corner,
                ..that.end
            }
        } else {
            this.end
        };
        Self {
            start,
            end,
            middle: this.middle,
        }
    }

    /// Whether applying the cut changes the face. A cut between two
    /// corners runs along an existing edge.
    #[must_use]
    pub fn splits(&self) -> bool {
        !(self.start.kind == SegmentKind::Vertex && self.end.kind == SegmentKind::Vertex)
    }

    /// Corners the cut passes through.
    #[must_use]
    pub fn touched_corners(&self) -> impl Iterator<Item = usize> + '_ {
        [&self.start, &self.end]
            .into_iter()
            .filter(|p| p.kind == SegmentKind::Vertex)
            .map(|p| p.corner)
    }
}
