use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates the simple polygon `ring` (closed implicitly).
///
/// Returns triangles as indices into `ring`, counter-clockwise in the ring's
/// 2D frame. Repeated points map to their first index. Collinear runs are
/// allowed and produce no zero-area triangles.
///
/// # Errors
///
/// Returns [`TessellationError::Failed`] if the ring has fewer than three
/// points, a coordinate is rejected by the triangulator, or two ring edges
/// cross.
pub fn triangulate_ring(ring: &[Point2]) -> Result<Vec<[usize; 3]>> {
    if ring.len() < 3 {
        return Err(TessellationError::Failed("ring needs at least 3 points".into()).into());
    }

    let mut cdt = Cdt::new();
    let mut handles = Vec::with_capacity(ring.len());
    let mut ring_index: HashMap<usize, usize> = HashMap::new();
    for (i, p) in ring.iter().enumerate() {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        ring_index.entry(h.index()).or_insert(i);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed(format!(
                "ring edge {i} crosses another ring edge"
            ))
            .into());
        }
        cdt.add_constraint(from, to);
    }

    let interior = classify_interior_faces(&cdt);
    let mut triangles = Vec::with_capacity(interior.len());
    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let [a, b, c] = face.vertices().map(|v| ring_index.get(&v.fix().index()).copied());
        if let (Some(a), Some(b), Some(c)) = (a, b, c) {
            triangles.push([a, b, c]);
        }
    }
    Ok(triangles)
}

/// Inner faces of the CDT lying inside the constraint ring, found by
/// flood fill from the hull: crossing a constraint edge toggles parity.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), depth));
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn area(ring: &[Point2], triangles: &[[usize; 3]]) -> f64 {
        triangles
            .iter()
            .map(|&[a, b, c]| (ring[b] - ring[a]).perp(&(ring[c] - ring[a])) * 0.5)
            .sum()
    }

    #[test]
    fn triangle_is_one_triangle() {
        let ring = [p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
        let tris = triangulate_ring(&ring).unwrap();
        assert_eq!(tris.len(), 1);
        assert!((area(&ring, &tris) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn concave_ring_excludes_notch() {
        // L-shape, area 3
        let ring = [
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 2.0),
            p(0.0, 2.0),
        ];
        let tris = triangulate_ring(&ring).unwrap();
        assert_eq!(tris.len(), 4);
        assert!((area(&ring, &tris) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn clockwise_ring_yields_counter_clockwise_triangles() {
        let ring = [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        let tris = triangulate_ring(&ring).unwrap();
        assert!((area(&ring, &tris) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn collinear_points_on_boundary() {
        let ring = [p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
        let tris = triangulate_ring(&ring).unwrap();
        assert_eq!(tris.len(), 2);
        assert!((area(&ring, &tris) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn too_few_points_fail() {
        assert!(triangulate_ring(&[p(0.0, 0.0), p(1.0, 0.0)]).is_err());
    }
}
