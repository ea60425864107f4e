// Error types for load sessions

use loadstone_abstraction::{ResolveError, ResourceCategory};
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by a load session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// One category's resolution failed; siblings that already settled are
    /// discarded.
    #[error("{category} resolution failed: {source}")]
    Category {
        /// The category that failed.
        category: ResourceCategory,
        /// The underlying resolution failure.
        #[source]
        source: ResolveError,
    },

    /// A resolution task panicked or was aborted by the runtime.
    #[error("resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SessionError {
    /// Whether the failure was caused by the cancellation signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Category {
                source: ResolveError::Cancelled,
                ..
            }
        )
    }
}
