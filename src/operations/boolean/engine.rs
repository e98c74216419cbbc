use tracing::{debug, instrument};

use crate::error::Result;
use crate::topology::{FaceStatus, Mesh, Provenance, Solid};

use super::classify::classify_faces;
use super::select::{selects, Construct, Operand};
use super::split::split_faces;

/// Executes a boolean operation on two solids.
///
/// Works on copies of both meshes, so the operands are never touched, on
/// success or failure. Orchestrates the full pipeline: splitting each mesh
/// against the other, classifying both, inverting the kept inside of the
/// right operand for a difference, and composing the result from the
/// faces the construct selects. Tolerances come from the left operand.
#[instrument(skip_all, fields(construct = %construct, left = left.name(), right = right.name()))]
pub(super) fn boolean_execute(left: &Solid, right: &Solid, construct: Construct) -> Result<Solid> {
    let params = *left.params();
    params.validate()?;

    let mut this = left.mesh().clone();
    let mut that = right.mesh().clone();
    this.reset_status();
    that.reset_status();

    let split_this = split_faces(&mut this, &that, &params)?;
    let split_that = split_faces(&mut that, &this, &params)?;
    debug!(
        left_faces = split_this.faces,
        right_faces = split_that.faces,
        "split phase done"
    );

    classify_faces(&mut this, &that, &params)?;
    classify_faces(&mut that, &this, &params)?;

    if construct == Construct::Difference {
        for id in that.face_ids() {
            let face = that.face_mut(id)?;
            if face.status() == FaceStatus::Inside {
                face.invert();
            }
        }
    }

    let mut result = Mesh::new();
    for (mesh, operand) in [(&this, Operand::This), (&that, Operand::That)] {
        for (_, face) in mesh.faces() {
            if selects(construct, operand, face.status()) {
                result.copy_face(mesh, face, params.eps)?;
            }
        }
    }
    debug!(faces = result.face_count(), "composed");

    Ok(Solid::from_parts(
        format!("{construct}({}, {})", left.name(), right.name()),
        result,
        params,
        Provenance {
            construct,
            left: left.name().to_owned(),
            right: right.name().to_owned(),
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Bound, Matrix4, Point3, Vector3};
    use crate::operations::boolean::{split_faces, CsgParams};
    use crate::operations::query::{SurfaceArea, Volume};
    use crate::test_support::unit_box;
    use crate::topology::VertexStatus;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn cube_a() -> Solid {
        unit_box("a", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
    }

    fn cube_b() -> Solid {
        unit_box("b", p(0.5, 0.0, 0.0), p(1.5, 1.0, 1.0))
    }

    fn assert_bound(solid: &Solid, min: Point3, max: Point3) {
        let bound: Bound = solid.bound();
        assert_relative_eq!(*bound.min(), min, epsilon = 1e-9);
        assert_relative_eq!(*bound.max(), max, epsilon = 1e-9);
    }

    fn assert_classified(solid: &Solid) {
        let mesh = solid.mesh();
        for (_, face) in mesh.faces() {
            assert_ne!(face.status(), FaceStatus::Unknown, "{}", face.name());
            for &v in face.vertices() {
                assert_ne!(mesh.vertex(v).unwrap().status(), VertexStatus::Unknown);
            }
        }
    }

    #[test]
    fn disjoint_cubes() {
        init_tracing();
        let a = cube_a();
        let far = unit_box("far", p(3.0, 3.0, 3.0), p(4.0, 4.0, 4.0));

        let union = boolean_execute(&a, &far, Construct::Union).unwrap();
        assert_eq!(union.face_count(), 24);

        let intersection = boolean_execute(&a, &far, Construct::Intersection).unwrap();
        assert_eq!(intersection.face_count(), 0);

        let difference = boolean_execute(&a, &far, Construct::Difference).unwrap();
        assert_eq!(difference.face_count(), 12);
        assert_eq!(difference.bound(), a.bound());
        assert_relative_eq!(Volume::new(&difference).execute(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn self_operations() {
        let a = cube_a();
        let intersection = boolean_execute(&a, &a, Construct::Intersection).unwrap();
        assert_eq!(intersection.face_count(), 12);
        assert_eq!(intersection.bound(), a.bound());

        let difference = boolean_execute(&a, &a, Construct::Difference).unwrap();
        assert_eq!(difference.face_count(), 0);
    }

    #[test]
    fn overlapping_cubes() {
        init_tracing();
        let (a, b) = (cube_a(), cube_b());

        let intersection = boolean_execute(&a, &b, Construct::Intersection).unwrap();
        assert_bound(&intersection, p(0.5, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert_relative_eq!(Volume::new(&intersection).execute(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(SurfaceArea::new(&intersection).execute(), 4.0, epsilon = 1e-9);

        let union = boolean_execute(&a, &b, Construct::Union).unwrap();
        assert_bound(&union, p(0.0, 0.0, 0.0), p(1.5, 1.0, 1.0));
        assert_relative_eq!(Volume::new(&union).execute(), 1.5, epsilon = 1e-9);
        assert_relative_eq!(SurfaceArea::new(&union).execute(), 8.0, epsilon = 1e-9);

        let difference = boolean_execute(&a, &b, Construct::Difference).unwrap();
        assert_bound(&difference, p(0.0, 0.0, 0.0), p(0.5, 1.0, 1.0));
        assert_relative_eq!(Volume::new(&difference).execute(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(SurfaceArea::new(&difference).execute(), 4.0, epsilon = 1e-9);

        for solid in [&intersection, &union, &difference] {
            assert_classified(solid);
        }
    }

    /// Checks `V(A+B) + V(A*B) = V(A) + V(B)` and `V(A-B) + V(A*B) = V(A)`
    /// and returns the union, intersection and difference volumes.
    fn assert_volume_identities(a: &Solid, b: &Solid) -> (f64, f64, f64) {
        let union = boolean_execute(a, b, Construct::Union).unwrap();
        let intersection = boolean_execute(a, b, Construct::Intersection).unwrap();
        let difference = boolean_execute(a, b, Construct::Difference).unwrap();
        for solid in [&union, &intersection, &difference] {
            assert_classified(solid);
        }

        let (va, vb) = (Volume::new(a).execute(), Volume::new(b).execute());
        let vu = Volume::new(&union).execute();
        let vi = Volume::new(&intersection).execute();
        let vd = Volume::new(&difference).execute();
        assert_relative_eq!(vu + vi, va + vb, epsilon = 1e-6);
        assert_relative_eq!(vd + vi, va, epsilon = 1e-6);
        (vu, vi, vd)
    }

    fn triangulated_faces(a: &Solid, b: &Solid) -> usize {
        let params = CsgParams::default();
        let mut this = a.mesh().clone();
        let mut that = b.mesh().clone();
        let forward = split_faces(&mut this, &that, &params).unwrap();
        let backward = split_faces(&mut that, &this, &params).unwrap();
        forward.triangulated + backward.triangulated
    }

    #[test]
    fn box_poking_through_a_face() {
        init_tracing();
        let a = cube_a();
        let b = unit_box("b", p(0.25, 0.25, 0.5), p(0.75, 0.75, 1.5));
        assert!(triangulated_faces(&a, &b) > 0);

        let (vu, vi, vd) = assert_volume_identities(&a, &b);
        assert_relative_eq!(vu, 1.125, epsilon = 1e-9);
        assert_relative_eq!(vi, 0.125, epsilon = 1e-9);
        assert_relative_eq!(vd, 0.875, epsilon = 1e-9);
    }

    #[test]
    fn tilted_box() {
        init_tracing();
        let a = cube_a();
        let mut b = unit_box("b", p(-0.5, -0.5, -0.5), p(0.5, 0.5, 0.5));
        b.transform(
            &(Matrix4::new_translation(&Vector3::new(0.9, 0.8, 0.7))
                * Matrix4::from_euler_angles(0.3, 0.2, 0.1)),
        )
        .unwrap();
        assert_relative_eq!(Volume::new(&b).execute(), 1.0, epsilon = 1e-9);

        let (_, vi, _) = assert_volume_identities(&a, &b);
        assert!(vi > 0.0 && vi < 1.0, "intersection volume {vi}");
    }

    #[test]
    fn union_commutes() {
        let (a, b) = (cube_a(), cube_b());
        let ab = boolean_execute(&a, &b, Construct::Union).unwrap();
        let ba = boolean_execute(&b, &a, Construct::Union).unwrap();
        assert_eq!(ab.bound(), ba.bound());
        assert_relative_eq!(
            Volume::new(&ab).execute(),
            Volume::new(&ba).execute(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            SurfaceArea::new(&ab).execute(),
            SurfaceArea::new(&ba).execute(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn operands_are_unchanged() {
        let (a, b) = (cube_a(), cube_b());
        let (bound_a, bound_b) = (a.bound(), b.bound());
        for construct in [Construct::Union, Construct::Intersection, Construct::Difference] {
            boolean_execute(&a, &b, construct).unwrap();
        }
        assert_eq!(a.bound(), bound_a);
        assert_eq!(b.bound(), bound_b);
        assert_eq!(a.face_count(), 12);
        assert_eq!(b.face_count(), 12);
        assert!(a
            .mesh()
            .faces()
            .all(|(_, f)| f.status() == FaceStatus::Unknown));
    }

    #[test]
    fn result_records_provenance() {
        let result = boolean_execute(&cube_a(), &cube_b(), Construct::Difference).unwrap();
        assert_eq!(result.name(), "difference(a, b)");
        let provenance = result.provenance().unwrap();
        assert_eq!(provenance.construct, Construct::Difference);
        assert_eq!(provenance.left, "a");
        assert_eq!(provenance.right, "b");
    }

    #[test]
    fn invalid_params_are_rejected() {
        let a = cube_a().with_params(CsgParams::default().with_eps(-1.0));
        assert!(boolean_execute(&a, &cube_b(), Construct::Union).is_err());
    }
}
