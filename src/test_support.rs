use crate::math::Point3;
use crate::topology::Solid;

/// Axis-aligned box from 12 outward-facing triangles.
#[allow(clippy::unwrap_used)]
pub fn unit_box(name: &str, min: Point3, max: Point3) -> Solid {
    let corners = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    let triangles = [
        [0, 3, 2],
        [0, 2, 1],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    let mut solid = Solid::new(name);
    for [a, b, c] in triangles {
        solid.add_face(corners[a], corners[b], corners[c]).unwrap();
    }
    solid
}
