use crate::error::{GeometryError, Result};

use super::{Point2, Point3, Vector3, EPS};

/// Side of a plane a point falls on, under a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    /// Classifies a signed distance against `eps`.
    #[must_use]
    pub fn of(distance: f64, eps: f64) -> Self {
        if distance > eps {
            Self::Positive
        } else if distance < -eps {
            Self::Negative
        } else {
            Self::Zero
        }
    }
}

/// An oriented plane `normal . p + offset = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3,
    offset: f64,
}

impl Plane {
    /// Creates the plane through three points. The normal follows the
    /// right-hand rule on `(a, b, c)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the points are collinear or
    /// coincident.
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Result<Self> {
        let cross = (b - a).cross(&(c - a));
        let len = cross.norm();
        if !len.is_finite() {
            return Err(GeometryError::NonFinite("plane").into());
        }
        if len < EPS * EPS {
            return Err(GeometryError::Degenerate(format!(
                "collinear points {a} {b} {c}"
            ))
            .into());
        }
        let normal = cross / len;
        Ok(Self {
            normal,
            offset: -normal.dot(&a.coords),
        })
    }

    /// Creates a plane through `point` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the normal has zero length.
    pub fn from_normal(point: &Point3, normal: &Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < EPS {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            offset: -normal.dot(&point.coords),
        })
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns `d` in `normal . p + d = 0`.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Signed distance of `point`; positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    /// Which side of the plane `point` lies on.
    #[must_use]
    pub fn sign(&self, point: &Point3, eps: f64) -> Sign {
        Sign::of(self.signed_distance(point), eps)
    }

    /// The same plane with the opposite orientation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Orthonormal in-plane axes `(u, v)` with `u x v = normal`.
    #[must_use]
    pub fn basis(&self) -> (Vector3, Vector3) {
        let reference = if self.normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = self.normal.cross(&reference).normalize();
        let v = self.normal.cross(&u);
        (u, v)
    }

    /// Projects `point` onto the plane's `(u, v)` axes. Counter-clockwise
    /// order around the normal stays counter-clockwise in 2D.
    #[must_use]
    pub fn project(&self, point: &Point3, basis: &(Vector3, Vector3)) -> Point2 {
        Point2::new(point.coords.dot(&basis.0), point.coords.dot(&basis.1))
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

    #[test]
    fn normal_follows_right_hand_rule() {
        let plane = Plane::from_points(&p(0.0, 0.0, 1.0), &p(1.0, 0.0, 1.0), &p(0.0, 1.0, 1.0))
            .unwrap();
        assert_relative_eq!(*plane.normal(), Vector3::z());
        assert_relative_eq!(plane.offset(), -1.0);
        assert_relative_eq!(plane.signed_distance(&p(3.0, -2.0, 4.0)), 3.0);
    }

    #[test]
    fn collinear_points_are_rejected() {
        let result = Plane::from_points(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 1.0), &p(2.0, 2.0, 2.0));
        assert!(result.is_err());
    }

    #[test]
    fn sign_respects_tolerance() {
        let plane = Plane::from_normal(&p(0.0, 0.0, 0.0), &Vector3::z()).unwrap();
        assert_eq!(plane.sign(&p(0.0, 0.0, 1e-10), EPS), Sign::Zero);
        assert_eq!(plane.sign(&p(0.0, 0.0, 1e-3), EPS), Sign::Positive);
        assert_eq!(plane.sign(&p(0.0, 0.0, -1e-3), EPS), Sign::Negative);
        assert_eq!(plane.flipped().sign(&p(0.0, 0.0, -1e-3), EPS), Sign::Positive);
    }

    #[test]
    fn basis_is_right_handed() {
        let plane = Plane::from_normal(&p(0.0, 0.0, 0.0), &Vector3::new(1.0, 2.0, -0.5)).unwrap();
        let (u, v) = plane.basis();
        assert_relative_eq!(u.cross(&v), *plane.normal(), epsilon = 1e-12);
        assert_relative_eq!(u.dot(plane.normal()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn projection_preserves_orientation() {
        let plane = Plane::from_points(&p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(0.0, 0.0, 1.0))
            .unwrap();
        let basis = plane.basis();
        let a = plane.project(&p(0.0, 0.0, 0.0), &basis);
        let b = plane.project(&p(0.0, 1.0, 0.0), &basis);
        let c = plane.project(&p(0.0, 0.0, 1.0), &basis);
        let area = (b - a).perp(&(c - a));
        assert!(area > 0.0);
    }
}
