use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by vectorization and similarity scoring.
pub enum ScoringError {
    /// Vectorizer settings are unusable.
    #[error("invalid vectorizer config: {reason}")]
    InvalidConfig {
        /// Error message.
        reason: String,
    },

    /// Vector blocks do not line up with the inputs they were built from.
    #[error("scoring computation failed: {reason}")]
    ComputationFailed {
        /// Error message.
        reason: String,
    },
}
