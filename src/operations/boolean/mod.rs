mod classify;
mod difference;
mod engine;
mod intersection;
mod path;
mod segment;
mod select;
mod split;
mod triangulate;
mod union;

pub use classify::{classify_faces, ray_trace};
pub use difference::Difference;
pub use intersection::Intersection;
pub use path::{Path, PathPoint, PointKind};
pub use segment::{Cut, CutPoint, Segment, SegmentKind};
pub use select::{selects, Construct, Operand};
pub use split::{split_faces, SplitStats};
pub use triangulate::{plan, Anchor, Kind, Region, RingPoint, Triangulation};
pub use union::Union;

use crate::error::{OperationError, Result};
use crate::math::EPS;

/// Tolerances and limits for boolean operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsgParams {
    /// Tolerance for on-plane tests, bound overlap and point coincidence.
    pub eps: f64,
    /// Magnitude of the direction nudge applied to a degenerate ray.
    pub perturbation: f64,
    /// Ray casts tried per face before classification gives up.
    pub max_ray_attempts: usize,
    /// Splitting fails once it runs more than this many iterations per
    /// input face.
    pub split_growth_limit: usize,
}

impl Default for CsgParams {
    fn default() -> Self {
        Self {
            eps: EPS,
            perturbation: 1e-5,
            max_ray_attempts: 16,
            split_growth_limit: 64,
        }
    }
}

impl CsgParams {
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    #[must_use]
    pub fn with_perturbation(mut self, perturbation: f64) -> Self {
        self.perturbation = perturbation;
        self
    }

    #[must_use]
    pub fn with_max_ray_attempts(mut self, attempts: usize) -> Self {
        self.max_ray_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_split_growth_limit(mut self, limit: usize) -> Self {
        self.split_growth_limit = limit;
        self
    }

    /// Checks that every tolerance is positive and every limit non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] naming the bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(OperationError::InvalidInput(format!("eps = {}", self.eps)).into());
        }
        if !(self.perturbation.is_finite() && self.perturbation > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "perturbation = {}",
                self.perturbation
            ))
            .into());
        }
        if self.max_ray_attempts == 0 {
            return Err(OperationError::InvalidInput("max_ray_attempts = 0".into()).into());
        }
        if self.split_growth_limit == 0 {
            return Err(OperationError::InvalidInput("split_growth_limit = 0".into()).into());
        }
        Ok(())
    }
}
