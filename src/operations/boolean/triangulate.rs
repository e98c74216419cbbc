use tracing::{debug, trace};

use crate::error::{OperationError, Result};
use crate::math::{midpoint, Point2, Point3};
use crate::tessellation::triangulate_ring;
use crate::topology::{Face, FaceId, FaceStatus, Mesh, VertexId, VertexStatus};

use super::classify::ray_trace;
use super::path::{Path, PointKind};
use super::CsgParams;

/// Shape of an intersection path across a face, named after its ends:
/// `V` a corner, `E` an edge point, and whether the path meets an edge
/// incident to its corner (`I`), the opposite edge (`T`) or another
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Corner to a point on an edge touching that corner.
    Vie,
    /// Corner to a point on the opposite edge.
    Vte,
    /// Corner to another corner, through the interior.
    Vtv,
    /// [`Kind::Vie`] walked backwards.
    Eiv,
    /// [`Kind::Vte`] walked backwards.
    Etv,
    /// Both ends on the same edge.
    Eie,
    /// Ends on two different edges.
    Ete,
}

impl Kind {
    /// Step name recorded on the faces it produces.
    #[must_use]
    pub fn step(self) -> &'static str {
        match self {
            Self::Vie => "triangulateVIE",
            Self::Vte => "triangulateVTE",
            Self::Vtv => "triangulateVTV",
            Self::Eiv => "triangulateEIV",
            Self::Etv => "triangulateETV",
            Self::Eie => "triangulateEIE",
            Self::Ete => "triangulateETE",
        }
    }
}

/// A vertex of a region ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPoint {
    /// Corner `k` of the face.
    Corner(usize),
    /// Point `i` of the (oriented) path.
    Point(usize),
}

/// Where the status of a region is read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// A corner of the face off the path.
    Corner(usize),
    /// A point on the face boundary off the path, classified by ray.
    At(Point3),
}

/// One side of the cut: a simple polygon and its status anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub ring: Vec<RingPoint>,
    pub anchor: Anchor,
}

/// How a face crossed by a path is re-triangulated.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    pub kind: Kind,
    /// The path, oriented the way the ring indices refer to it.
    pub path: Path,
    pub regions: [Region; 2],
}

/// Picks the [`Kind`] of `path` across the triangle `corners` and lays out
/// the two regions it cuts the face into.
///
/// Returns `None` for a path that starts and ends on the same corner or
/// has an end inside the face.
#[must_use]
pub fn plan(corners: &[Point3; 3], path: &Path) -> Option<Triangulation> {
    let (first, last) = (path.first()?.kind, path.last()?.kind);
    match (first, last) {
        (PointKind::Corner(s), PointKind::Corner(e)) if s != e => {
            Some(vertex_to_vertex(corners, path.clone(), s, e))
        }
        (PointKind::Corner(s), PointKind::Edge(j)) => {
            Some(from_vertex(corners, path.clone(), s, j, Kind::Vie, Kind::Vte))
        }
        (PointKind::Edge(j), PointKind::Corner(s)) => {
            Some(from_vertex(corners, path.reversed(), s, j, Kind::Eiv, Kind::Etv))
        }
        (PointKind::Edge(i), PointKind::Edge(j)) if i == j => {
            Some(along_one_edge(corners, path, i))
        }
        (PointKind::Edge(i), PointKind::Edge(j)) => Some(across_two_edges(path, i, j)),
        _ => None,
    }
}

fn rotation(k: usize) -> (usize, usize, usize) {
    (k % 3, (k + 1) % 3, (k + 2) % 3)
}

fn ring(
    head: &[RingPoint],
    run: impl Iterator<Item = usize>,
    tail: &[RingPoint],
) -> Vec<RingPoint> {
    head.iter()
        .copied()
        .chain(run.map(RingPoint::Point))
        .chain(tail.iter().copied())
        .collect()
}

fn last_index(path: &Path) -> usize {
    path.points().len().saturating_sub(1)
}

#[allow(clippy::many_single_char_names)]
fn vertex_to_vertex(corners: &[Point3; 3], path: Path, s: usize, e: usize) -> Triangulation {
    use RingPoint::Corner;
    let n = last_index(&path);
    let (a, b, c) = rotation(s);
    let regions = if e == b {
        [
            Region {
                ring: ring(&[Corner(a), Corner(b)], (1..n).rev(), &[]),
                anchor: Anchor::At(midpoint(&corners[a], &corners[b])),
            },
            Region {
                ring: ring(&[Corner(a)], 1..n, &[Corner(b), Corner(c)]),
                anchor: Anchor::Corner(c),
            },
        ]
    } else {
        [
            Region {
                ring: ring(&[Corner(c), Corner(a)], 1..n, &[]),
                anchor: Anchor::At(midpoint(&corners[c], &corners[a])),
            },
            Region {
                ring: ring(&[Corner(a), Corner(b), Corner(c)], (1..n).rev(), &[]),
                anchor: Anchor::Corner(b),
            },
        ]
    };
    Triangulation {
        kind: Kind::Vtv,
        path,
        regions,
    }
}

/// Path from corner `s` to a point on edge `j`.
#[allow(clippy::many_single_char_names)]
fn from_vertex(
    corners: &[Point3; 3],
    path: Path,
    s: usize,
    j: usize,
    incident: Kind,
    through: Kind,
) -> Triangulation {
    use RingPoint::Corner;
    let n = last_index(&path);
    let (a, b, c) = rotation(s);
    let end = path.points()[n].position;
    let (kind, regions) = if j == b {
        (
            through,
            [
                Region {
                    ring: ring(&[Corner(a), Corner(b)], (1..=n).rev(), &[]),
                    anchor: Anchor::Corner(b),
                },
                Region {
                    ring: ring(&[Corner(a)], 1..=n, &[Corner(c)]),
                    anchor: Anchor::Corner(c),
                },
            ],
        )
    } else if j == a {
        (
            incident,
            [
                Region {
                    ring: ring(&[Corner(a)], (1..=n).rev(), &[]),
                    anchor: Anchor::At(midpoint(&corners[a], &end)),
                },
                Region {
                    ring: ring(&[Corner(a)], 1..=n, &[Corner(b), Corner(c)]),
                    anchor: Anchor::Corner(c),
                },
            ],
        )
    } else {
        (
            incident,
            [
                Region {
                    ring: ring(&[Corner(a)], 1..=n, &[]),
                    anchor: Anchor::At(midpoint(&end, &corners[a])),
                },
                Region {
                    ring: ring(&[Corner(a), Corner(b), Corner(c)], (1..=n).rev(), &[]),
                    anchor: Anchor::Corner(b),
                },
            ],
        )
    };
    Triangulation {
        kind,
        path,
        regions,
    }
}

/// Both ends on edge `i`. The path is oriented to start next to corner `i`.
#[allow(clippy::many_single_char_names)]
fn along_one_edge(corners: &[Point3; 3], path: &Path, i: usize) -> Triangulation {
    use RingPoint::{Corner, Point};
    let (a, b, c) = rotation(i);
    let n = last_index(path);
    let points = path.points();
    let outbound = (points[0].position - corners[a]).norm() <= (points[n].position - corners[a]).norm();
    let path = if outbound { path.clone() } else { path.reversed() };
    let near = path.points()[0].position;
    let far = path.points()[n].position;
    Triangulation {
        kind: Kind::Eie,
        regions: [
            Region {
                ring: ring(&[Point(0), Point(n)], (1..n).rev(), &[]),
                anchor: Anchor::At(midpoint(&near, &far)),
            },
            Region {
                ring: ring(&[Corner(a)], 0..=n, &[Corner(b), Corner(c)]),
                anchor: Anchor::Corner(c),
            },
        ],
        path,
    }
}

/// Ends on edges `i` and `j`, which always share one corner. The face is
/// rotated so that corner is `b` and the path runs from edge `ab` to edge
/// `bc`.
#[allow(clippy::many_single_char_names)]
fn across_two_edges(path: &Path, i: usize, j: usize) -> Triangulation {
    use RingPoint::{Corner, Point};
    let (k, path) = if (i + 1) % 3 == j {
        (i, path.clone())
    } else {
        (j, path.reversed())
    };
    let (a, b, c) = rotation(k);
    let n = last_index(&path);
    Triangulation {
        kind: Kind::Ete,
        regions: [
            Region {
                ring: ring(&[Point(0), Corner(b), Point(n)], (1..n).rev(), &[]),
                anchor: Anchor::Corner(b),
            },
            Region {
                ring: ring(&[Corner(a)], 0..=n, &[Corner(c)]),
                anchor: Anchor::Corner(c),
            },
        ],
        path,
    }
}

/// Replaces face `id` by the triangles of both regions of `triangulation`.
///
/// Every triangle of a region takes the region's anchor status when the
/// anchor resolves to inside or outside, and stays unknown otherwise.
///
/// # Errors
///
/// Returns [`OperationError::UnclassifiedPath`] if a ring fails to
/// triangulate or the pieces do not cover the face.
#[allow(clippy::many_single_char_names)]
pub(super) fn apply(
    mesh: &mut Mesh,
    id: FaceId,
    triangulation: &Triangulation,
    other: &Mesh,
    params: &CsgParams,
) -> Result<Vec<FaceId>> {
    let face = mesh.face(id)?.clone();
    let unclassified = |reason: String| OperationError::UnclassifiedPath {
        face: face.name().to_string(),
        path: format!("{} ({reason})", triangulation.path),
    };

    let basis = face.plane().basis();
    let mut pieces = Vec::new();
    let mut covered = 0.0;
    for region in &triangulation.regions {
        let mut ids: Vec<VertexId> = Vec::with_capacity(region.ring.len());
        let mut flat: Vec<Point2> = Vec::with_capacity(region.ring.len());
        let mut positions: Vec<Point3> = Vec::with_capacity(region.ring.len());
        for &point in &region.ring {
            let vid = ring_vertex(mesh, &face, &triangulation.path, point, params.eps);
            let position = *mesh.vertex(vid)?.position();
            ids.push(vid);
            flat.push(face.plane().project(&position, &basis));
            positions.push(position);
        }

        let triangles = triangulate_ring(&flat).map_err(|e| unclassified(e.to_string()))?;
        let status = anchor_status(&face, region.anchor, mesh, other, params)?;
        trace!(kind = ?triangulation.kind, ?status, triangles = triangles.len(), "region");
        for [i, j, k] in triangles {
            covered += (positions[j] - positions[i])
                .cross(&(positions[k] - positions[i]))
                .norm()
                * 0.5;
            pieces.push(([ids[i], ids[j], ids[k]], status));
        }
    }

    let area = face.area();
    if (covered - area).abs() > 1e-6 * area.max(params.eps) {
        return Err(unclassified(format!("pieces cover {covered}, face has {area}")).into());
    }

    debug!(face = %face.name(), kind = ?triangulation.kind, pieces = pieces.len(), "triangulated");
    mesh.replace_face(id, &pieces, triangulation.kind.step())
}

fn ring_vertex(mesh: &mut Mesh, face: &Face, path: &Path, point: RingPoint, eps: f64) -> VertexId {
    match point {
        RingPoint::Corner(k) => face.vertices()[k],
        RingPoint::Point(i) => {
            let point = &path.points()[i];
            match point.kind {
                PointKind::Corner(k) => face.vertices()[k],
                PointKind::Edge(_) | PointKind::Interior => {
                    mesh.intern(&point.position, VertexStatus::Boundary, eps)
                }
            }
        }
    }
}

fn anchor_status(
    face: &Face,
    anchor: Anchor,
    mesh: &Mesh,
    other: &Mesh,
    params: &CsgParams,
) -> Result<FaceStatus> {
    let origin = match anchor {
        Anchor::Corner(k) => {
            let vertex = mesh.vertex(face.vertices()[k])?;
            if let Some(status) = FaceStatus::from_vertex(vertex.status()) {
                return Ok(status);
            }
            *vertex.position()
        }
        Anchor::At(point) => point,
    };
    let status = ray_trace(&origin, face.normal(), other, params, face.name())?;
    Ok(match status {
        FaceStatus::Inside | FaceStatus::Outside => status,
        _ => FaceStatus::Unknown,
    })
}
