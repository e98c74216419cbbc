pub mod face;
pub mod solid;
pub mod vertex;

pub use face::{Face, FaceId, FaceName, FaceStatus};
pub use solid::{Provenance, Solid};
pub use vertex::{Vertex, VertexId, VertexKey, VertexStatus};

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use crate::error::{CsgError, GeometryError, Result, TopologyError};
use crate::math::{Bound, Matrix4, Point3};

/// Arena owning the vertices and faces of one solid.
///
/// Faces keep a stable insertion order. Splitting retires a face and appends
/// its replacements; [`Mesh::compact`] splices replacements back into the
/// position of the face they replaced and drops dead entries. Vertices are
/// deduplicated by exact (snapped) coordinates.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: SlotMap<VertexId, Vertex>,
    faces: SlotMap<FaceId, Face>,
    order: Vec<FaceId>,
    lookup: HashMap<VertexKey, VertexId>,
    next_index: usize,
}

impl Mesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Returns the vertex id at `position`, creating it if needed.
    ///
    /// An existing vertex adopts `status` if it is still unknown, and always
    /// adopts [`VertexStatus::Boundary`].
    pub fn intern(&mut self, position: &Point3, status: VertexStatus, eps: f64) -> VertexId {
        let position = vertex::snap(position, eps);
        let key = VertexKey::of(&position);
        if let Some(&id) = self.lookup.get(&key) {
            if let Some(existing) = self.vertices.get_mut(id) {
                if status == VertexStatus::Boundary || existing.status() == VertexStatus::Unknown {
                    existing.set_status(status);
                }
                return id;
            }
        }
        let id = self.vertices.insert(Vertex::new(position, status));
        self.lookup.insert(key, id);
        id
    }

    /// Returns a reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn vertex(&self, id: VertexId) -> std::result::Result<&Vertex, TopologyError> {
        self.vertices
            .get(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Returns a mutable reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn vertex_mut(
        &mut self,
        id: VertexId,
    ) -> std::result::Result<&mut Vertex, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over all vertices.
    #[must_use]
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    // --- Face operations ---

    /// Adds a face over three existing vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if two vertices coincide or the
    /// triangle has no area, or an error if a vertex is missing.
    pub fn add_face(&mut self, vertices: [VertexId; 3], name: FaceName) -> Result<FaceId> {
        let [a, b, c] = vertices;
        if a == b || b == c || a == c {
            return Err(GeometryError::Degenerate(format!("{name} repeats a vertex")).into());
        }
        let corners = [
            *self.vertex(a)?.position(),
            *self.vertex(b)?.position(),
            *self.vertex(c)?.position(),
        ];
        let face = Face::new(vertices, corners, name)?;
        let id = self.faces.insert(face);
        for v in vertices {
            self.vertex_mut(v)?.attach(id);
        }
        self.order.push(id);
        Ok(id)
    }

    /// Adds a face from corner positions, deduplicating the corners.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle is degenerate or a coordinate is not
    /// finite.
    pub fn add_triangle(&mut self, corners: [Point3; 3], eps: f64) -> Result<FaceId> {
        if corners.iter().any(|c| !c.coords.iter().all(|v| v.is_finite())) {
            return Err(GeometryError::NonFinite("face corner").into());
        }
        let ids = corners.map(|c| self.intern(&c, VertexStatus::Unknown, eps));
        let id = self.add_face(ids, FaceName::input(self.next_index))?;
        self.next_index += 1;
        Ok(id)
    }

    /// Returns a reference to the face, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn face(&self, id: FaceId) -> std::result::Result<&Face, TopologyError> {
        self.faces.get(id).ok_or(TopologyError::EntityNotFound("face"))
    }

    /// Returns a mutable reference to the face, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn face_mut(&mut self, id: FaceId) -> std::result::Result<&mut Face, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("face"))
    }

    /// Iterates over live faces in order.
    #[must_use]
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.order
            .iter()
            .filter_map(|&id| self.faces.get(id).map(|f| (id, f)))
            .filter(|(_, f)| f.is_alive())
    }

    /// Snapshot of the live face ids in order.
    #[must_use]
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces().map(|(id, _)| id).collect()
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces().count()
    }

    /// Bound of all live faces, or `None` for an empty mesh.
    #[must_use]
    pub fn bound(&self) -> Option<Bound> {
        self.faces()
            .map(|(_, f)| *f.bound())
            .reduce(|acc, b| acc.union(&b))
    }

    /// Retires `id` and adds `pieces` in its place, each with its initial
    /// status.
    ///
    /// Pieces that turn out degenerate are skipped. Vertices of the retired
    /// face stay in the mesh until [`Mesh::compact`].
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or a piece vertex is missing.
    pub fn replace_face(
        &mut self,
        id: FaceId,
        pieces: &[([VertexId; 3], FaceStatus)],
        step: &'static str,
    ) -> Result<Vec<FaceId>> {
        let old = self.face(id)?;
        let name = old.name().derived(step);
        let corners = *old.vertices();

        let mut created = Vec::with_capacity(pieces.len());
        for &(piece, status) in pieces {
            match self.add_face(piece, name) {
                Ok(fid) => {
                    self.face_mut(fid)?.set_status(status);
                    created.push(fid);
                }
                Err(CsgError::Geometry(err)) => {
                    tracing::trace!(%name, %err, "skipping degenerate split piece");
                }
                Err(err) => return Err(err),
            }
        }

        self.face_mut(id)?.retire(created.clone());
        for v in corners {
            self.vertex_mut(v)?.detach(id);
        }
        Ok(created)
    }

    /// Splices replacements into the order of the faces they replaced,
    /// drops dead faces and vertices no live face uses.
    pub fn compact(&mut self) {
        let mut order = Vec::with_capacity(self.order.len());
        let mut placed = HashSet::new();
        for id in std::mem::take(&mut self.order) {
            let mut stack = vec![id];
            while let Some(id) = stack.pop() {
                if !placed.insert(id) {
                    continue;
                }
                let Some(face) = self.faces.get(id) else {
                    continue;
                };
                if face.is_alive() {
                    order.push(id);
                } else {
                    stack.extend(face.replaced_by().iter().rev());
                }
            }
        }
        self.order = order;
        self.faces.retain(|_, f| f.is_alive());

        let orphans: Vec<VertexId> = self
            .vertices
            .iter()
            .filter(|(_, v)| v.members().is_empty())
            .map(|(id, _)| id)
            .collect();
        for id in orphans {
            if let Some(v) = self.vertices.remove(id) {
                self.lookup.remove(&VertexKey::of(v.position()));
            }
        }
    }

    /// Resets every face and vertex status to unknown.
    pub fn reset_status(&mut self) {
        for (_, face) in &mut self.faces {
            face.set_status(FaceStatus::Unknown);
        }
        for (_, vertex) in &mut self.vertices {
            vertex.set_status(VertexStatus::Unknown);
        }
    }

    /// Copies a face of another mesh, with its status and the statuses of
    /// its corners.
    ///
    /// # Errors
    ///
    /// Returns an error if a corner of `face` is missing from `source`.
    pub fn copy_face(&mut self, source: &Mesh, face: &Face, eps: f64) -> Result<FaceId> {
        let mut ids = [VertexId::default(); 3];
        for (slot, &v) in ids.iter_mut().zip(face.vertices()) {
            let vertex = source.vertex(v)?;
            *slot = self.intern(vertex.position(), vertex.status(), eps);
        }
        let id = self.add_face(ids, *face.name())?;
        self.face_mut(id)?.set_status(face.status());
        Ok(id)
    }

    /// A new mesh with every vertex mapped through `matrix`. Statuses are
    /// not carried over.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses a face.
    pub fn transformed(&self, matrix: &Matrix4, eps: f64) -> Result<Mesh> {
        let mut mesh = Mesh::new();
        for (_, face) in self.faces() {
            let corners = face.corners().map(|c| matrix.transform_point(&c));
            let ids = corners.map(|c| mesh.intern(&c, VertexStatus::Unknown, eps));
            mesh.add_face(ids, *face.name())?;
        }
        mesh.next_index = self.next_index;
        Ok(mesh)
    }
}
