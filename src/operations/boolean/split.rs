use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::error::{OperationError, Result};
use crate::math::{Line, Point3, Sign};
use crate::topology::{Face, FaceId, FaceStatus, Mesh, VertexId, VertexStatus};

use super::path::Path;
use super::segment::{Cut, Segment, SegmentKind};
use super::triangulate;
use super::CsgParams;

/// Counters from one [`split_faces`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    /// Faces taken off the worklist.
    pub iterations: usize,
    /// Faces replaced by a single cut.
    pub splits: usize,
    /// Faces replaced by triangulating a chained path.
    pub triangulated: usize,
    /// Live faces once splitting settled.
    pub faces: usize,
}

/// Splits the faces of `mesh` until none is crossed by a face of `other`.
///
/// Faces are processed from a worklist seeded with the current faces;
/// every replacement piece goes back on the worklist. A face crossed by one
/// cut is split by the matching fixed layout. A face crossed by several
/// cuts that chain into one path is triangulated along the whole path;
/// cuts that do not chain are applied one at a time. Corners that a cut
/// runs through are marked as boundary. The mesh is compacted at the end.
///
/// # Errors
///
/// Returns [`OperationError::SplitLimit`] if the worklist does not drain
/// within `split_growth_limit` iterations per input face,
/// [`OperationError::UnclassifiedPath`] if a chained path fits no
/// triangulation, or a geometry error if two crossing faces have parallel
/// planes.
pub fn split_faces(mesh: &mut Mesh, other: &Mesh, params: &CsgParams) -> Result<SplitStats> {
    let eps = params.eps;
    let mut stats = SplitStats::default();
    let Some(other_bound) = other.bound() else {
        stats.faces = mesh.face_count();
        return Ok(stats);
    };

    let limit = mesh.face_count().max(1) * params.split_growth_limit;
    let mut queue: VecDeque<FaceId> = mesh.face_ids().into();
    while let Some(id) = queue.pop_front() {
        stats.iterations += 1;
        if stats.iterations > limit {
            let faces = mesh.face_count();
            warn!(limit, faces, "face splitting does not settle");
            return Err(OperationError::SplitLimit { limit, faces }.into());
        }

        let face = mesh.face(id)?.clone();
        if !face.is_alive() || !face.bound().overlaps(&other_bound, eps) {
            continue;
        }

        let cuts = collect_cuts(&face, other, eps)?;
        for cut in &cuts {
            for k in cut.touched_corners() {
                mesh.vertex_mut(face.vertices()[k])?
                    .set_status(VertexStatus::Boundary);
            }
        }

        let cuts: Vec<Cut> = cuts.into_iter().filter(Cut::splits).collect();
        let pieces = match cuts.as_slice() {
            [] => continue,
            [cut] => {
                stats.splits += 1;
                split_once(mesh, id, &face, cut, eps)?
            }
            [first, ..] => match Path::chain(&cuts, eps) {
                Some(path) => {
                    let Some(plan) = triangulate::plan(face.corners(), &path) else {
                        return Err(OperationError::UnclassifiedPath {
                            face: face.name().to_string(),
                            path: path.to_string(),
                        }
                        .into());
                    };
                    stats.triangulated += 1;
                    triangulate::apply(mesh, id, &plan, other, params)?
                }
                None => {
                    trace!(face = %face.name(), cuts = cuts.len(), "cuts do not chain");
                    stats.splits += 1;
                    split_once(mesh, id, &face, first, eps)?
                }
            },
        };
        queue.extend(pieces);
    }

    mesh.compact();
    stats.faces = mesh.face_count();
    debug!(
        iterations = stats.iterations,
        splits = stats.splits,
        triangulated = stats.triangulated,
        faces = stats.faces,
        "split faces"
    );
    Ok(stats)
}

fn uniform(signs: [Sign; 3]) -> bool {
    signs[0] == signs[1] && signs[1] == signs[2]
}

/// Cuts made on `face` by the faces of `other` it crosses.
fn collect_cuts(face: &Face, other: &Mesh, eps: f64) -> Result<Vec<Cut>> {
    let mut cuts = Vec::new();
    for (_, that) in other.faces() {
        if !face.bound().overlaps(that.bound(), eps) {
            continue;
        }
        let this_distances = face.corners().map(|c| that.plane().signed_distance(&c));
        let this_signs = this_distances.map(|d| Sign::of(d, eps));
        if uniform(this_signs) {
            continue;
        }
        let that_distances = that.corners().map(|c| face.plane().signed_distance(&c));
        let that_signs = that_distances.map(|d| Sign::of(d, eps));
        if uniform(that_signs) {
            continue;
        }

        let line = Line::from_planes(face.plane(), that.plane())?;
        let this = Segment::new(&line, face.corners(), this_signs, this_distances)?;
        let that = Segment::new(&line, that.corners(), that_signs, that_distances)?;
        if this.intersects(&that, eps) {
            cuts.push(Cut::resolve(&this, &that, eps));
        }
    }
    Ok(cuts)
}

/// Replaces `face` according to a single cut.
fn split_once(mesh: &mut Mesh, id: FaceId, face: &Face, cut: &Cut, eps: f64) -> Result<Vec<FaceId>> {
    use SegmentKind::{Edge, Face as Inner, Vertex};
    let (start, end) = (&cut.start, &cut.end);

    if cut.middle == Edge {
        return split_along_edge(mesh, id, face, cut, eps);
    }
    match (start.kind, end.kind) {
        (Vertex, Vertex) => Ok(Vec::new()),
        (Vertex, Edge) => split_edge(mesh, id, face, end.corner, &end.position, "split2V", eps),
        (Edge, Vertex) => split_edge(mesh, id, face, start.corner, &start.position, "split2V", eps),
        (Vertex, Inner) => split_center(mesh, id, face, &end.position, "split3V", eps),
        (Inner, Vertex) => split_center(mesh, id, face, &start.position, "split3V", eps),
        (Edge, Edge) => split_corner(mesh, id, face, cut, eps),
        (Edge, Inner) => {
            split_edge_center(mesh, id, face, start.corner, &start.position, &end.position, eps)
        }
        (Inner, Edge) => {
            split_edge_center(mesh, id, face, end.corner, &end.position, &start.position, eps)
        }
        (Inner, Inner) if (start.position - end.position).norm() < eps => {
            split_center(mesh, id, face, &start.position, "split3", eps)
        }
        (Inner, Inner) => split_interior(mesh, id, face, &start.position, &end.position, eps),
    }
}

fn rotated(face: &Face, k: usize) -> (VertexId, VertexId, VertexId) {
    let v = face.vertices();
    (v[k % 3], v[(k + 1) % 3], v[(k + 2) % 3])
}

fn boundary(mesh: &mut Mesh, position: &Point3, eps: f64) -> VertexId {
    mesh.intern(position, VertexStatus::Boundary, eps)
}

fn replace(
    mesh: &mut Mesh,
    id: FaceId,
    pieces: &[[VertexId; 3]],
    step: &'static str,
) -> Result<Vec<FaceId>> {
    let pieces: Vec<([VertexId; 3], FaceStatus)> =
        pieces.iter().map(|&p| (p, FaceStatus::Unknown)).collect();
    mesh.replace_face(id, &pieces, step)
}

/// A cut lying on an edge of the face, covering only part of it.
#[allow(clippy::many_single_char_names)]
fn split_along_edge(
    mesh: &mut Mesh,
    id: FaceId,
    face: &Face,
    cut: &Cut,
    eps: f64,
) -> Result<Vec<FaceId>> {
    let (s, e) = (cut.start.corner, cut.end.corner);
    let k = if (s + 1) % 3 == e { s } else { e };
    let corner = face.corners()[k];

    let mut inner: Vec<Point3> = [&cut.start, &cut.end]
        .into_iter()
        .filter(|p| p.kind == SegmentKind::Edge)
        .map(|p| p.position)
        .collect();
    inner.sort_by(|p, q| (p - corner).norm().total_cmp(&(q - corner).norm()));
    match inner.as_slice() {
        [] => Ok(Vec::new()),
        [p] => split_edge(mesh, id, face, k, p, "split2I", eps),
        [p, q] if (p - q).norm() < eps => split_edge(mesh, id, face, k, p, "split2I", eps),
        [p, q, ..] => {
            let (a, b, c) = rotated(face, k);
            let p1 = boundary(mesh, p, eps);
            let p2 = boundary(mesh, q, eps);
            replace(mesh, id, &[[a, p1, c], [p1, p2, c], [p2, b, c]], "split3I")
        }
    }
}

/// One new point on edge `k -> k + 1`.
#[allow(clippy::many_single_char_names)]
fn split_edge(
    mesh: &mut Mesh,
    id: FaceId,
    face: &Face,
    k: usize,
    position: &Point3,
    step: &'static str,
    eps: f64,
) -> Result<Vec<FaceId>> {
    let (a, b, c) = rotated(face, k);
    let p = boundary(mesh, position, eps);
    replace(mesh, id, &[[a, p, c], [p, b, c]], step)
}

/// One new point inside the face.
#[allow(clippy::many_single_char_names)]
fn split_center(
    mesh: &mut Mesh,
    id: FaceId,
    face: &Face,
    position: &Point3,
    step: &'static str,
    eps: f64,
) -> Result<Vec<FaceId>> {
    let (a, b, c) = rotated(face, 0);
    let p = boundary(mesh, position, eps);
    replace(mesh, id, &[[a, b, p], [b, c, p], [c, a, p]], step)
}

/// Cut between points on two edges, which meet at one corner.
#[allow(clippy::many_single_char_names)]
fn split_corner(mesh: &mut Mesh, id: FaceId, face: &Face, cut: &Cut, eps: f64) -> Result<Vec<FaceId>> {
    let (i, j) = (cut.start.corner, cut.end.corner);
    let (k, on_ab, on_bc) = if (i + 1) % 3 == j {
        (i, &cut.start.position, &cut.end.position)
    } else {
        (j, &cut.end.position, &cut.start.position)
    };
    let (a, b, c) = rotated(face, k);
    let pab = boundary(mesh, on_ab, eps);
    let pbc = boundary(mesh, on_bc, eps);
    replace(mesh, id, &[[a, pab, pbc], [a, pbc, c], [pab, b, pbc]], "split3L")
}

/// One new point on edge `k -> k + 1` and one inside the face.
#[allow(clippy::many_single_char_names)]
fn split_edge_center(
    mesh: &mut Mesh,
    id: FaceId,
    face: &Face,
    k: usize,
    on_edge: &Point3,
    inside: &Point3,
    eps: f64,
) -> Result<Vec<FaceId>> {
    let (a, b, c) = rotated(face, k);
    let p = boundary(mesh, on_edge, eps);
    let q = boundary(mesh, inside, eps);
    replace(mesh, id, &[[a, p, q], [p, b, q], [b, c, q], [c, a, q]], "split4V")
}

/// Two new points inside the face. The cut is fanned from the corner the
/// line through it separates best from the other two.
#[allow(clippy::many_single_char_names)]
fn split_interior(
    mesh: &mut Mesh,
    id: FaceId,
    face: &Face,
    first: &Point3,
    second: &Point3,
    eps: f64,
) -> Result<Vec<FaceId>> {
    let corners = face.corners();
    let normal = face.normal();
    let orient = |p: &Point3, q: &Point3, r: &Point3| (q - p).cross(&(r - p)).dot(normal);

    let mut best: Option<(f64, usize, Point3, Point3)> = None;
    for k in 0..3 {
        let (a, b, c) = (&corners[k], &corners[(k + 1) % 3], &corners[(k + 2) % 3]);
        let (near, far) = if (first - a).norm() <= (second - a).norm() {
            (*first, *second)
        } else {
            (*second, *first)
        };
        let score = orient(b, &far, &near).min(orient(c, &near, &far));
        if best.is_none_or(|(s, ..)| score > s) {
            best = Some((score, k, near, far));
        }
    }
    let Some((_, k, near, far)) = best else {
        return Ok(Vec::new());
    };

    let (a, b, c) = rotated(face, k);
    let p1 = boundary(mesh, &far, eps);
    let p2 = boundary(mesh, &near, eps);
    replace(
        mesh,
        id,
        &[[b, c, p1], [b, p1, p2], [c, p2, p1], [b, p2, a], [c, a, p2]],
        "split5I",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::unit_box;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn total_area(mesh: &Mesh) -> f64 {
        mesh.faces().map(|(_, f)| f.area()).sum()
    }

    fn single_face(corners: [Point3; 3]) -> (Mesh, FaceId) {
        let mut mesh = Mesh::new();
        let id = mesh.add_triangle(corners, crate::math::EPS).unwrap();
        (mesh, id)
    }

    #[test]
    fn interior_cut_keeps_area_and_orientation() {
        let (mut mesh, id) = single_face([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        let face = mesh.face(id).unwrap().clone();
        let pieces =
            split_interior(&mut mesh, id, &face, &p(0.2, 0.2, 0.0), &p(0.4, 0.3, 0.0), 1e-8)
                .unwrap();
        assert_eq!(pieces.len(), 5);
        assert!((total_area(&mesh) - 0.5).abs() < 1e-12);
        for (_, f) in mesh.faces() {
            assert!(f.normal().z > 0.0);
        }
    }

    #[test]
    fn edge_and_center_split_into_four() {
        let (mut mesh, id) = single_face([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        let face = mesh.face(id).unwrap().clone();
        let pieces = split_edge_center(
            &mut mesh,
            id,
            &face,
            0,
            &p(0.5, 0.0, 0.0),
            &p(0.3, 0.3, 0.0),
            1e-8,
        )
        .unwrap();
        assert_eq!(pieces.len(), 4);
        assert!((total_area(&mesh) - 0.5).abs() < 1e-12);
        let new = mesh.vertices().filter(|(_, v)| v.status() == VertexStatus::Boundary);
        assert_eq!(new.count(), 2);
    }

    #[test]
    fn disjoint_meshes_are_untouched() {
        let a = unit_box("a", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = unit_box("b", p(3.0, 0.0, 0.0), p(4.0, 1.0, 1.0));
        let mut mesh = a.mesh().clone();
        let stats = split_faces(&mut mesh, b.mesh(), &CsgParams::default()).unwrap();
        assert_eq!(stats.splits + stats.triangulated, 0);
        assert_eq!(stats.faces, 12);
    }

    #[test]
    fn overlapping_boxes_split_along_the_seam() {
        let a = unit_box("a", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = unit_box("b", p(0.5, 0.0, 0.0), p(1.5, 1.0, 1.0));
        let mut mesh = a.mesh().clone();
        let stats = split_faces(&mut mesh, b.mesh(), &CsgParams::default()).unwrap();
        assert!(stats.faces > 12);
        assert!((total_area(&mesh) - 6.0).abs() < 1e-9);
        // every face now lies on one side of the plane x = 0.5
        for (_, face) in mesh.faces() {
            let xs = face.corners().map(|c| c.x);
            let below = xs.iter().all(|&x| x <= 0.5 + 1e-9);
            let above = xs.iter().all(|&x| x >= 0.5 - 1e-9);
            assert!(below || above, "{} straddles x = 0.5", face.name());
        }
    }

    #[test]
    fn runaway_splitting_is_capped() {
        let a = unit_box("a", p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = unit_box("b", p(0.5, 0.0, 0.0), p(1.5, 1.0, 1.0));
        let mut mesh = a.mesh().clone();
        let params = CsgParams::default().with_split_growth_limit(1);
        let result = split_faces(&mut mesh, b.mesh(), &params);
        assert!(matches!(
            result,
            Err(crate::error::CsgError::Operation(OperationError::SplitLimit { .. }))
        ));
    }
}
