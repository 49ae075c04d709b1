use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::RunError;
use crate::catalog::{Collection, CollectionKind, Product};
use crate::constants::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_SUGGESTIONS_PER_PRODUCT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A proposed product -> collection assignment.
///
/// Wire names follow the public API (`collection_type`, `confidence_score`).
pub struct Suggestion {
    pub product_id: String,
    pub product_title: String,
    pub collection_id: String,
    pub collection_title: String,
    #[serde(rename = "collection_type")]
    pub collection_kind: CollectionKind,
    /// Cosine similarity of the two titles, in `[0, 1]`.
    #[serde(rename = "confidence_score")]
    pub confidence: f64,
    /// Whether the link already exists remotely (filled in by the status resolver).
    #[serde(default)]
    pub already_assigned: bool,
}

impl Suggestion {
    /// Creates a not-yet-resolved suggestion.
    pub fn new(product: &Product, collection: &Collection, confidence: f64) -> Self {
        Self {
            product_id: product.id.clone(),
            product_title: product.title.clone(),
            collection_id: collection.id.clone(),
            collection_title: collection.title.clone(),
            collection_kind: collection.kind,
            confidence,
            already_assigned: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Per-run parameters.
pub struct RunParams {
    /// Commit high-confidence suggestions without review.
    #[serde(default)]
    pub auto_apply: bool,
    /// Minimum similarity (inclusive) for a suggestion to be surfaced.
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
    /// Maximum suggestions kept per product.
    #[serde(default = "default_max_per_product")]
    pub max_suggestions_per_product: usize,
}

fn default_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_max_per_product() -> usize {
    DEFAULT_MAX_SUGGESTIONS_PER_PRODUCT
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            auto_apply: false,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_suggestions_per_product: DEFAULT_MAX_SUGGESTIONS_PER_PRODUCT,
        }
    }
}

impl RunParams {
    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = auto_apply;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_max_per_product(mut self, max: usize) -> Self {
        self.max_suggestions_per_product = max;
        self
    }

    pub fn validate(&self) -> Result<(), RunError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(RunError::InvalidParams {
                reason: format!(
                    "confidence_threshold must be between 0.0 and 1.0, got {}",
                    self.confidence_threshold
                ),
            });
        }
        if self.max_suggestions_per_product == 0 {
            return Err(RunError::InvalidParams {
                reason: "max_suggestions_per_product must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Aggregate counts for one run.
pub struct RunStats {
    pub total_products: usize,
    /// All collections, smart included.
    pub total_collections: usize,
    pub custom_collections: usize,
    pub total_suggestions: usize,
    /// Successful writes only (always 0 without auto-apply).
    pub total_applied: usize,
    pub new_assignments: usize,
    #[serde(rename = "already_assigned")]
    pub already_assigned_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Terminal output of a run.
pub struct RunResult {
    pub run_id: Uuid,
    /// Capped suggestions, globally sorted by descending confidence.
    pub suggestions: Vec<Suggestion>,
    /// Subset of `suggestions` that was committed (empty unless auto-apply).
    pub applied: Vec<Suggestion>,
    pub stats: RunStats,
}
