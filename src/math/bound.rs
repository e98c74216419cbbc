use std::fmt;

use super::Point3;

/// Axis-aligned bounding box.
///
/// Used as a cheap rejection test before plane intersection: it must always
/// enclose the true geometry. The default value is the degenerate box at the
/// origin, which is what an empty solid reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    min: Point3,
    max: Point3,
}

impl Default for Bound {
    fn default() -> Self {
        Self::from_point(&Point3::origin())
    }
}

impl Bound {
    /// A box containing exactly one point.
    #[must_use]
    pub fn from_point(point: &Point3) -> Self {
        Self {
            min: *point,
            max: *point,
        }
    }

    /// The smallest box containing every point, or `None` for no points.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bound = Self::from_point(first);
        for p in points {
            bound.include(p);
        }
        Some(bound)
    }

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// The smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns `false` only if some axis separates the boxes by more than
    /// `eps`.
    #[must_use]
    pub fn overlaps(&self, other: &Self, eps: f64) -> bool {
        (0..3).all(|axis| {
            self.min[axis] <= other.max[axis] + eps && self.max[axis] >= other.min[axis] - eps
        })
    }

    /// Whether `point` lies inside the box grown by `eps`.
    #[must_use]
    pub fn contains(&self, point: &Point3, eps: f64) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min[axis] - eps && point[axis] <= self.max[axis] + eps
        })
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> &Point3 {
        &self.min
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> &Point3 {
        &self.max
    }

    /// Center of the box.
    #[must_use]
    pub fn mid(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min.x
    }

    #[must_use]
    pub fn mid_x(&self) -> f64 {
        (self.min.x + self.max.x) * 0.5
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max.x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min.y
    }

    #[must_use]
    pub fn mid_y(&self) -> f64 {
        (self.min.y + self.max.y) * 0.5
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max.y
    }

    #[must_use]
    pub fn min_z(&self) -> f64 {
        self.min.z
    }

    #[must_use]
    pub fn mid_z(&self) -> f64 {
        (self.min.z + self.max.z) * 0.5
    }

    #[must_use]
    pub fn max_z(&self) -> f64 {
        self.max.z
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}] x [{}, {}]",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::EPS;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn encloses_all_points() {
        let bound = Bound::from_points(&[p(1.0, -2.0, 0.5), p(-1.0, 3.0, 0.0), p(0.0, 0.0, 2.0)])
            .unwrap();
        assert_eq!(*bound.min(), p(-1.0, -2.0, 0.0));
        assert_eq!(*bound.max(), p(1.0, 3.0, 2.0));
        assert_eq!(bound.mid(), p(0.0, 0.5, 1.0));
        assert!((bound.mid_y() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn empty_input_has_no_bound() {
        assert!(Bound::from_points(std::iter::empty::<&Point3>()).is_none());
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = Bound::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)]).unwrap();
        let b = Bound::from_points(&[p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0)]).unwrap();
        assert!(a.overlaps(&b, EPS));
        assert!(b.overlaps(&a, EPS));
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = Bound::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)]).unwrap();
        let b = Bound::from_points(&[p(0.0, 0.0, 1.001), p(1.0, 1.0, 2.0)]).unwrap();
        assert!(!a.overlaps(&b, EPS));
    }

    #[test]
    fn union_covers_both() {
        let a = Bound::from_point(&p(0.0, 0.0, 0.0));
        let b = Bound::from_point(&p(2.0, -1.0, 3.0));
        let u = a.union(&b);
        assert!(u.contains(&p(1.0, -0.5, 1.5), 0.0));
        assert!(!u.contains(&p(2.5, 0.0, 0.0), EPS));
    }

    #[test]
    fn display_lists_axis_ranges() {
        let bound = Bound::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(bound.to_string(), "[0, 1] x [0, 2] x [0, 3]");
    }
}
