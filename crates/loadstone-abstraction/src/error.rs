//! Error types for asset resolution.

use thiserror::Error;

/// Result type for resolution operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Errors surfaced by the external resolution primitive.
///
/// Cancellation is a distinct kind so callers can tell "user canceled"
/// apart from "resource unavailable".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The source could not produce a resolved file.
    #[error("resolution failed: {0}")]
    Failed(String),

    /// The source does not handle this raw item shape.
    #[error("unsupported raw item: {0}")]
    Unsupported(String),

    /// Resolution was aborted by the cancellation signal.
    #[error("resolution cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Whether this failure was caused by the cancellation signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
