use thiserror::Error;

/// Top-level error type for the csgmesh engine.
#[derive(Debug, Error)]
pub enum CsgError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),
}

/// Errors related to the mesh arena and the shadow stack of a solid.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("solid already holds an unpopped shadow")]
    ShadowInUse,

    #[error("solid has no shadow to pop")]
    NoShadow,

    #[error("triangle soup of {0} coordinates is not a multiple of 9")]
    InvalidCoordinates(usize),
}

/// Errors raised while running a boolean operation.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot triangulate intersection path on {face}: {path}")]
    UnclassifiedPath { face: String, path: String },

    #[error("face splitting exceeded {limit} iterations ({faces} faces)")]
    SplitLimit { limit: usize, faces: usize },

    #[error("ray classification of {face} failed after all perturbations")]
    RayTraceFailed { face: String },

    #[error("classification incomplete: {0}")]
    Unclassified(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`CsgError`].
pub type Result<T> = std::result::Result<T, CsgError>;
