//! Error types for the quest engine.

use crate::database::StoreError;
use thiserror::Error;

/// Errors raised by a single engine operation. None of them are fatal.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The remote store failed; nothing was applied locally.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The operation was rejected before any network call.
    #[error("{0}")]
    Precondition(&'static str),

    #[error("task {0} is not part of this quest")]
    TaskNotFound(uuid::Uuid),

    /// The session is loading or a submission is in flight.
    #[error("quest session is busy ({0:?})")]
    NotReady(crate::services::session::SessionPhase),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no signed-in user")]
    NotAuthenticated,
}

impl EngineError {
    /// Transient failures the user can retry as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::Store(_) | EngineError::NotReady(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
