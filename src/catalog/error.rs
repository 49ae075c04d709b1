use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Failure kinds reported by catalog collaborators.
///
/// The engine matches on these instead of suppressing errors wholesale: status lookups degrade
/// to "unknown", apply failures mark a suggestion as skipped, fetch failures abort the run.
pub enum CatalogError {
    /// The call did not complete within its time budget.
    #[error("catalog call '{operation}' timed out after {elapsed:?}")]
    Timeout {
        /// Logical operation name.
        operation: &'static str,
        /// Budget that was exceeded.
        elapsed: Duration,
    },

    /// The remote service throttled the request and retries were exhausted.
    #[error("catalog rate limit exceeded (retry after {retry_after:?})")]
    RateLimited {
        /// Server-advertised wait before the next attempt.
        retry_after: Duration,
    },

    /// Non-success HTTP status.
    #[error("catalog returned HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Connection/transport level failure.
    #[error("catalog transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("failed to decode catalog response: {0}")]
    Decode(String),

    /// An identifier could not be converted to the remote id format.
    #[error("invalid {field} '{value}': expected an unsigned integer id")]
    InvalidId {
        /// Which id (`product_id` / `collection_id`).
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// No store credentials were supplied or configured.
    #[error("catalog store not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Returns `true` for failures that may succeed if attempted later.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Timeout { .. }
            | CatalogError::RateLimited { .. }
            | CatalogError::Transport(_) => true,
            CatalogError::Http { status, .. } => *status >= 500,
            CatalogError::Decode(_)
            | CatalogError::InvalidId { .. }
            | CatalogError::NotConfigured(_) => false,
        }
    }

    /// Short machine-readable label (used in events and logs).
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Timeout { .. } => "timeout",
            CatalogError::RateLimited { .. } => "rate_limited",
            CatalogError::Http { .. } => "http",
            CatalogError::Transport(_) => "transport",
            CatalogError::Decode(_) => "decode",
            CatalogError::InvalidId { .. } => "invalid_id",
            CatalogError::NotConfigured(_) => "not_configured",
        }
    }
}

/// Result alias for catalog collaborator calls.
pub type CatalogResult<T> = Result<T, CatalogError>;
