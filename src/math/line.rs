use crate::error::{GeometryError, Result};

use super::{Plane, Point3, Vector3, EPS};

/// Fixed nudge directions for [`Line::perturb_direction`]. None of them is
/// axis-aligned, so a nudge never lands back in the plane of an
/// axis-aligned face.
const PERTURBATIONS: [[f64; 3]; 8] = [
    [0.267, 0.534, 0.802],
    [-0.802, 0.267, 0.534],
    [0.534, -0.802, 0.267],
    [-0.267, -0.534, 0.802],
    [0.802, -0.267, -0.534],
    [-0.534, 0.802, -0.267],
    [0.267, -0.802, -0.534],
    [0.534, 0.267, -0.802],
];

/// An infinite line (or ray) `point + t * direction` with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    point: Point3,
    direction: Vector3,
}

impl Line {
    /// Creates a line through `point` along `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `direction` is shorter than
    /// [`EPS`].
    pub fn new(point: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < EPS {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            point,
            direction: direction / len,
        })
    }

    /// Line through two points, directed from `a` to `b`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the points coincide.
    pub fn through(a: &Point3, b: &Point3) -> Result<Self> {
        Self::new(*a, b - a)
    }

    /// Intersection line of two planes, directed along `n1 x n2`.
    ///
    /// The point on the line is solved on the coordinate plane orthogonal to
    /// the dominant axis of the direction, which keeps the 2x2 solve away
    /// from a near-zero determinant.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the planes are parallel or
    /// coincident.
    pub fn from_planes(first: &Plane, second: &Plane) -> Result<Self> {
        let (n1, n2) = (first.normal(), second.normal());
        let (d1, d2) = (first.offset(), second.offset());
        let dir = n1.cross(n2);
        if dir.norm() < EPS {
            return Err(GeometryError::Degenerate("intersection of parallel planes".into()).into());
        }

        let (ax, ay, az) = (dir.x.abs(), dir.y.abs(), dir.z.abs());
        let point = if ax >= ay && ax >= az {
            Point3::new(
                0.0,
                (d2 * n1.z - d1 * n2.z) / dir.x,
                (d1 * n2.y - d2 * n1.y) / dir.x,
            )
        } else if ay >= az {
            Point3::new(
                (d1 * n2.z - d2 * n1.z) / dir.y,
                0.0,
                (d2 * n1.x - d1 * n2.x) / dir.y,
            )
        } else {
            Point3::new(
                (d2 * n1.y - d1 * n2.y) / dir.z,
                (d1 * n2.x - d2 * n1.x) / dir.z,
                0.0,
            )
        };

        Self::new(point, dir)
    }

    /// A point on the line.
    #[must_use]
    pub fn point(&self) -> &Point3 {
        &self.point
    }

    /// Unit direction.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// The point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.point + self.direction * t
    }

    /// Signed parameter of the orthogonal projection of `point`.
    #[must_use]
    pub fn parameter_of(&self, point: &Point3) -> f64 {
        (point - self.point).dot(&self.direction)
    }

    /// Parameter where the line crosses `plane`, or `None` if it runs
    /// parallel to it within `eps`.
    #[must_use]
    pub fn plane_parameter(&self, plane: &Plane, eps: f64) -> Option<f64> {
        let denom = plane.normal().dot(&self.direction);
        if denom.abs() < eps {
            return None;
        }
        Some(-plane.signed_distance(&self.point) / denom)
    }

    /// Point where the line crosses `plane`, or `None` if it runs parallel
    /// to it within `eps`.
    #[must_use]
    pub fn plane_intersection(&self, plane: &Plane, eps: f64) -> Option<Point3> {
        self.plane_parameter(plane, eps).map(|t| self.at(t))
    }

    /// Nudges the direction by a fixed, attempt-indexed offset of the given
    /// magnitude. Deterministic: the same attempt always gives the same
    /// direction.
    pub fn perturb_direction(&mut self, attempt: usize, magnitude: f64) {
        let [x, y, z] = PERTURBATIONS[attempt % PERTURBATIONS.len()];
        #[allow(clippy::cast_precision_loss)]
        let scale = magnitude * (1 + attempt / PERTURBATIONS.len()) as f64;
        let nudged = self.direction + Vector3::new(x, y, z) * scale;
        let len = nudged.norm();
        if len > EPS {
            self.direction = nudged / len;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    #[test]
    fn perpendicular_planes_meet_along_axis() {
        let xy = Plane::from_normal(&p(0.0, 0.0, 0.0), &v(0.0, 0.0, 1.0)).unwrap();
        let xz = Plane::from_normal(&p(0.0, 0.0, 0.0), &v(0.0, 1.0, 0.0)).unwrap();
        let line = Line::from_planes(&xy, &xz).unwrap();
        assert_relative_eq!(line.direction().x.abs(), 1.0);
    }

    #[test]
    fn line_point_lies_on_both_planes() {
        let first = Plane::from_normal(&p(0.5, 0.0, 0.0), &v(1.0, 0.0, 0.0)).unwrap();
        let second = Plane::from_normal(&p(0.0, 0.2, 1.0), &v(0.0, 1.0, 1.0)).unwrap();
        let line = Line::from_planes(&first, &second).unwrap();
        for t in [-2.0, 0.0, 3.5] {
            let q = line.at(t);
            assert_relative_eq!(first.signed_distance(&q), 0.0, epsilon = 1e-12);
            assert_relative_eq!(second.signed_distance(&q), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn parallel_planes_have_no_line() {
        let a = Plane::from_normal(&p(0.0, 0.0, 0.0), &v(0.0, 0.0, 1.0)).unwrap();
        let b = Plane::from_normal(&p(0.0, 0.0, 5.0), &v(0.0, 0.0, -1.0)).unwrap();
        assert!(Line::from_planes(&a, &b).is_err());
    }

    #[test]
    fn parameter_is_signed() {
        let line = Line::new(p(1.0, 1.0, 1.0), v(0.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(line.parameter_of(&p(7.0, 4.0, -1.0)), 3.0);
        assert_relative_eq!(line.parameter_of(&p(0.0, -1.0, 0.0)), -2.0);
    }

    #[test]
    fn crosses_third_plane() {
        let line = Line::through(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 0.0)).unwrap();
        let plane = Plane::from_normal(&p(0.25, 0.0, 0.0), &v(1.0, 0.0, 0.0)).unwrap();
        let hit = line.plane_intersection(&plane, EPS).unwrap();
        assert_relative_eq!(hit, p(0.25, 0.25, 0.0), epsilon = 1e-12);

        let parallel = Plane::from_normal(&p(0.0, 0.0, 1.0), &v(0.0, 0.0, 1.0)).unwrap();
        assert!(line.plane_intersection(&parallel, EPS).is_none());
    }

    #[test]
    fn perturbation_is_deterministic() {
        let mut a = Line::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let mut b = a;
        a.perturb_direction(3, 1e-5);
        b.perturb_direction(3, 1e-5);
        assert_eq!(a, b);
        assert_relative_eq!(a.direction().norm(), 1.0, epsilon = 1e-12);
        assert!(a.direction().x != 0.0);
    }
}
