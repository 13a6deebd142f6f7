//! Orchestrator error type

use crate::remote::RemoteError;
use crate::tree::TreeError;
use thiserror::Error;

/// Errors returned by [`crate::store::DashboardStore`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// The edit was rejected before anything changed
    #[error(transparent)]
    Validation(#[from] TreeError),

    /// Persisting failed; the config was rolled back
    #[error("Failed to save dashboard config: {0}")]
    Remote(#[from] RemoteError),
}

/// Result type alias for orchestrator operations
pub type DashboardResult<T> = Result<T, DashboardError>;
