use thiserror::Error;

use crate::catalog::CatalogError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
/// Errors that abort a suggestion run.
///
/// Collaborator failures during status resolution and auto-apply never surface here; they are
/// recovered per suggestion.
pub enum RunError {
    /// The catalog has no products.
    #[error("no products found")]
    NoProducts,

    /// The catalog has no collections at all.
    #[error("no collections found")]
    NoCollections,

    /// Collections exist, but none accepts manual assignment.
    #[error("no custom collections found")]
    NoEligibleCollections,

    /// Run parameters are out of range.
    #[error("invalid run parameters: {reason}")]
    InvalidParams {
        /// Error message.
        reason: String,
    },

    /// Fetching the catalog failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Vectorization/scoring failed.
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

impl RunError {
    /// Returns `true` for the "nothing to work on" preconditions.
    pub fn is_input_absence(&self) -> bool {
        matches!(
            self,
            RunError::NoProducts | RunError::NoCollections | RunError::NoEligibleCollections
        )
    }
}
