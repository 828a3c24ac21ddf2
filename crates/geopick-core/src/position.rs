//! Device-position collaborator interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::location::Coordinates;

/// Errors from a device-position lookup.
#[derive(Debug, Error)]
pub enum PositionError {
    /// No position capability exists in this environment.
    #[error("device position is not supported")]
    Unsupported,
    /// The capability exists but no fix could be produced.
    #[error("device position unavailable: {0}")]
    Unavailable(String),
}

/// Single-shot, best-effort device position.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PositionError`] when no fix can be produced.
    async fn current_position(&self) -> Result<Coordinates, PositionError>;
}
