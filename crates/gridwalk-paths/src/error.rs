//! Error type for searches, reconstruction and probing.

use gridwalk_core::{GridError, Pose};

use crate::config::Cost;

/// Errors raised by [`Search`](crate::Search) and the code built on it.
///
/// An exhausted search is not an error: [`Search::run`](crate::Search::run)
/// returns `Ok(None)`. [`SearchError::Unreachable`] exists for callers that
/// require a route, see [`Search::require_best`](crate::Search::require_best).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Reconstruction met a pose with no usable predecessor record.
    #[error("no predecessor record for {pose}")]
    MalformedState { pose: Pose },
    #[error("step weight must be positive, got {step}")]
    InvalidWeights { step: Cost },
    #[error("no route found")]
    Unreachable,
}
