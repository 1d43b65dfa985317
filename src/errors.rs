//! Error types for title resolution.
//!
//! The text-rewriting pipeline itself is infallible over its input:
//! malformed tokens are left as ordinary text and spans that cannot be
//! parsed are passed through untouched. The only fallible collaborator is
//! the [`TitleResolver`](crate::reflist::TitleResolver), whose failures
//! are recovered via [`FallbackPolicy`](crate::config::FallbackPolicy)
//! and never surfaced to the caller of `annotate`.

use thiserror::Error;

/// Result type alias for title resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Error types a title resolver may return.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The cited entity does not exist upstream.
    #[error("no title found for cited entity '{key}'")]
    NotFound { key: String },

    /// The lookup itself failed (network, decode, upstream outage).
    #[error("title lookup failed: {0}")]
    Upstream(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ResolveError {
    fn from(error: anyhow::Error) -> Self {
        ResolveError::Other(error.to_string())
    }
}

impl ResolveError {
    /// Check if the error means the entity is simply unknown, as opposed
    /// to a transient lookup failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}
