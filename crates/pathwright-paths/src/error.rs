//! Error types surfaced by the engine and its collaborators.
//!
//! "No path" is not an error: searches report it as `Ok(None)`.

use thiserror::Error;

/// Failure reported by a scene collaborator (obstacle query, grid geometry
/// or gridless solver construction).
///
/// A failing collaborator invalidates every guarantee the search relies on,
/// so the engine never recovers from it locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SceneError {
    message: String,
}

impl SceneError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned from [`Pathfinder`](crate::Pathfinder) entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// The token footprint cannot key a cache or a gridless solver.
    #[error("invalid token footprint {0}: size must be finite and positive")]
    InvalidFootprint(f64),

    /// A grid-only operation was called on a gridless scene.
    #[error("scene has no grid")]
    NotAGrid,

    /// A scene collaborator failed.
    #[error("scene query failed: {0}")]
    Scene(#[from] SceneError),
}

pub type PathResult<T> = Result<T, PathError>;
