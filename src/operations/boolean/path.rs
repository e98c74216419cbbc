use std::fmt;

use crate::math::Point3;

use super::segment::{Cut, CutPoint, SegmentKind};

/// Where a path point sits on the face it crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// On corner `k`.
    Corner(usize),
    /// Inside edge `k -> k + 1`.
    Edge(usize),
    /// Inside the face.
    Interior,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub kind: PointKind,
    pub position: Point3,
}

impl From<&CutPoint> for PathPoint {
    fn from(point: &CutPoint) -> Self {
        let kind = match point.kind {
            SegmentKind::Vertex => PointKind::Corner(point.corner),
            SegmentKind::Edge => PointKind::Edge(point.corner),
            SegmentKind::Face => PointKind::Interior,
        };
        Self {
            kind,
            position: point.position,
        }
    }
}

impl PathPoint {
    fn on_boundary(&self) -> bool {
        self.kind != PointKind::Interior
    }
}

/// A polyline crossing one face from boundary to boundary, with every joint
/// strictly inside the face.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    #[must_use]
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self { points }
    }

    /// Chains cuts into one boundary-to-boundary path.
    ///
    /// Returns `None` unless every cut is used exactly once, the two free
    /// ends lie on the face boundary, and every joint is an interior point
    /// shared (within `eps`) by exactly two cuts. Cuts running along an edge
    /// never chain.
    #[must_use]
    pub fn chain(cuts: &[Cut], eps: f64) -> Option<Self> {
        let mut links: Vec<(PathPoint, PathPoint)> = Vec::with_capacity(cuts.len());
        for cut in cuts {
            if cut.middle != SegmentKind::Face {
                return None;
            }
            let (start, end) = (PathPoint::from(&cut.start), PathPoint::from(&cut.end));
            if (start.position - end.position).norm() < eps {
                return None;
            }
            links.push((start, end));
        }

        let boundary_ends = links
            .iter()
            .flat_map(|(s, e)| [s, e])
            .filter(|p| p.on_boundary())
            .count();
        if boundary_ends != 2 {
            return None;
        }

        let first = links
            .iter()
            .position(|(s, e)| s.on_boundary() || e.on_boundary())?;
        let (s, e) = links.swap_remove(first);
        let (head, mut tail) = if s.on_boundary() { (s, e) } else { (e, s) };
        let mut points = vec![head, tail];

        while !tail.on_boundary() {
            let next = links.iter().position(|(s, e)| {
                (s.kind == PointKind::Interior && (s.position - tail.position).norm() < eps)
                    || (e.kind == PointKind::Interior && (e.position - tail.position).norm() < eps)
            })?;
            let (s, e) = links.swap_remove(next);
            tail = if (s.position - tail.position).norm() < eps { e } else { s };
            points.push(tail);
        }

        links.is_empty().then(|| Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    #[must_use]
    pub fn first(&self) -> Option<&PathPoint> {
        self.points.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    /// The same path walked from the other end.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            let p = &point.position;
            write!(f, "{:?}({}, {}, {})", point.kind, p.x, p.y, p.z)?;
        }
        Ok(())
    }
}
