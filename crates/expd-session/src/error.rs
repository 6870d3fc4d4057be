//! Session error types.

use expd_client::storage::StorageError;
use expd_client::ApiError;
use thiserror::Error;

use crate::session::AuthPhase;

/// Errors from session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The token could not be read, written or removed.
    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),

    /// The attempted phase change is not part of the lifecycle.
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        /// Current phase.
        from: AuthPhase,
        /// Attempted phase.
        to: AuthPhase,
    },
}

impl SessionError {
    /// Operator-facing message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
