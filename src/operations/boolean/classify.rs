use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::error::{OperationError, Result};
use crate::math::{Line, Point3, Vector3};
use crate::topology::{FaceId, FaceName, FaceStatus, Mesh, VertexId, VertexStatus};

use super::CsgParams;

/// Classifies every live face of `mesh` against the closed mesh `other`.
///
/// A face with a status already set (by triangulation) keeps it. Otherwise
/// a face outside the bound of `other` is outside, a face with an inside
/// or outside corner takes that status, and any other face is ray traced
/// from its centroid. Each decided face floods its status to unknown
/// vertices and on to the faces around them.
///
/// # Errors
///
/// Returns [`OperationError::RayTraceFailed`] if a ray stays degenerate
/// after every perturbation, or [`OperationError::Unclassified`] if a face
/// or vertex is left unknown.
pub fn classify_faces(mesh: &mut Mesh, other: &Mesh, params: &CsgParams) -> Result<()> {
    let other_bound = other.bound();
    let mut traced = 0usize;

    for id in mesh.face_ids() {
        let face = mesh.face(id)?;
        let mut status = face.status();
        if status == FaceStatus::Unknown {
            let outside = other_bound
                .as_ref()
                .is_none_or(|b| !face.bound().overlaps(b, params.eps));
            status = if outside {
                FaceStatus::Outside
            } else if let Some(status) = corner_status(mesh, face.vertices())? {
                status
            } else {
                traced += 1;
                ray_trace(&face.centroid(), face.normal(), other, params, face.name())?
            };
            mesh.face_mut(id)?.set_status(status);
        }
        propagate(mesh, id)?;
    }

    verify(mesh)?;
    debug!(faces = mesh.face_count(), traced, "classified");
    Ok(())
}

fn corner_status(mesh: &Mesh, vertices: &[VertexId; 3]) -> Result<Option<FaceStatus>> {
    for &v in vertices {
        if let Some(status) = FaceStatus::from_vertex(mesh.vertex(v)?.status()) {
            return Ok(Some(status));
        }
    }
    Ok(None)
}

/// Spreads the status of face `start` through shared vertices.
///
/// Inside and outside flood across every unknown vertex into the unknown
/// faces around it. Coplanar and boundary faces only mark their unknown
/// corners as boundary.
fn propagate(mesh: &mut Mesh, start: FaceId) -> Result<()> {
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        let face = mesh.face(id)?;
        let status = face.status();
        let corners = *face.vertices();
        let spread = status.vertex_status();

        for v in corners {
            let vertex = mesh.vertex_mut(v)?;
            if vertex.status() != VertexStatus::Unknown {
                continue;
            }
            vertex.set_status(spread);
            if spread == VertexStatus::Boundary {
                continue;
            }
            let members = vertex.members().to_vec();
            for member in members {
                let face = mesh.face_mut(member)?;
                if face.is_alive() && face.status() == FaceStatus::Unknown {
                    face.set_status(status);
                    queue.push_back(member);
                }
            }
        }
    }
    Ok(())
}

fn verify(mesh: &Mesh) -> Result<()> {
    for (_, face) in mesh.faces() {
        if face.status() == FaceStatus::Unknown {
            return Err(OperationError::Unclassified(face.name().to_string()).into());
        }
        for &v in face.vertices() {
            if mesh.vertex(v)?.status() == VertexStatus::Unknown {
                return Err(OperationError::Unclassified(format!(
                    "corner of {}",
                    face.name()
                ))
                .into());
            }
        }
    }
    Ok(())
}

/// Classifies the point `origin` of face `name` against the closed mesh
/// `other` by casting a ray along `direction` and looking at the closest
/// face it hits.
///
/// No hit means outside. A hit at the origin itself means the face is
/// coplanar with the hit face: [`FaceStatus::Same`] if their normals
/// agree, [`FaceStatus::Opposite`] otherwise. Otherwise the ray leaves
/// through the closest face (inside) or enters it (outside). A ray lying
/// in the plane of a face it could hit is nudged and cast again.
///
/// # Errors
///
/// Returns [`OperationError::RayTraceFailed`] if the ray is still
/// degenerate after `max_ray_attempts` casts.
pub fn ray_trace(
    origin: &Point3,
    direction: &Vector3,
    other: &Mesh,
    params: &CsgParams,
    name: &FaceName,
) -> Result<FaceStatus> {
    let eps = params.eps;
    let mut ray = Line::new(*origin, *direction)?;

    'attempt: for attempt in 0..params.max_ray_attempts {
        let mut closest: Option<(f64, f64)> = None;
        let mut ambiguous = false;
        for (_, face) in other.faces() {
            let plane = face.plane();
            let dot = plane.normal().dot(ray.direction());
            let distance = plane.signed_distance(origin);

            if dot.abs() < eps && distance.abs() < eps {
                trace!(%name, attempt, "ray runs along a face, perturbing");
                ray.perturb_direction(attempt, params.perturbation);
                continue 'attempt;
            }

            if distance.abs() < eps && face.contains_point(origin, eps) {
                return Ok(if dot > 0.0 {
                    FaceStatus::Same
                } else {
                    FaceStatus::Opposite
                });
            }

            let Some(t) = ray.plane_parameter(plane, eps) else {
                continue;
            };
            if t <= eps || !face.contains_point(&ray.at(t), eps) {
                continue;
            }
            match closest {
                Some((best, best_dot)) if (t - best).abs() < eps => {
                    // an edge shared by faces seen from opposite sides
                    ambiguous |= (best_dot > 0.0) != (dot > 0.0);
                }
                Some((best, _)) if t > best => {}
                _ => {
                    closest = Some((t, dot));
                    ambiguous = false;
                }
            }
        }

        match closest {
            None => return Ok(FaceStatus::Outside),
            Some((_, dot)) if !ambiguous && dot > eps => return Ok(FaceStatus::Inside),
            Some((_, dot)) if !ambiguous && dot < -eps => return Ok(FaceStatus::Outside),
            Some(_) => {
                trace!(%name, attempt, "ray grazes the closest hit, perturbing");
                ray.perturb_direction(attempt, params.perturbation);
            }
        }
    }

    warn!(%name, attempts = params.max_ray_attempts, "ray classification failed");
    Err(OperationError::RayTraceFailed {
        face: name.to_string(),
    }
    .into())
}
