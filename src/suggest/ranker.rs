use std::cmp::Ordering;

use tracing::debug;

use super::types::Suggestion;
use crate::catalog::{Collection, Product};
use crate::scoring::{ScoringError, SimilarityMatrix, TfIdfVectorizer, score_titles};

/// Turns products and collections into thresholded, per-product ranked suggestions.
#[derive(Debug, Clone, Default)]
pub struct SuggestionRanker {
    vectorizer: TfIdfVectorizer,
}

impl SuggestionRanker {
    pub fn new(vectorizer: TfIdfVectorizer) -> Self {
        Self { vectorizer }
    }

    /// Scores `products` against the eligible subset of `collections` and ranks the result.
    ///
    /// Smart collections are removed before vectorization, so they never enter the shared
    /// vocabulary nor the output.
    pub fn rank(
        &self,
        products: &[Product],
        collections: &[Collection],
        threshold: f64,
    ) -> Result<Vec<Suggestion>, ScoringError> {
        let eligible: Vec<&Collection> = collections.iter().filter(|c| c.is_eligible()).collect();
        if products.is_empty() || eligible.is_empty() {
            return Ok(Vec::new());
        }

        let product_titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        let collection_titles: Vec<&str> = eligible.iter().map(|c| c.title.as_str()).collect();

        let matrix = score_titles(&self.vectorizer, &product_titles, &collection_titles)?;
        Ok(rank_matrix(products, &eligible, &matrix, threshold))
    }
}

/// Emits, per product, every collection scoring `>= threshold`, best first.
///
/// Ties keep the original collection order. Products with no qualifying collection contribute
/// nothing.
pub fn rank_matrix(
    products: &[Product],
    collections: &[&Collection],
    matrix: &SimilarityMatrix,
    threshold: f64,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for (i, product) in products.iter().enumerate() {
        let scores = matrix.row(i);

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });

        suggestions.extend(
            order
                .into_iter()
                .take_while(|&j| scores[j] >= threshold)
                .map(|j| Suggestion::new(product, collections[j], scores[j])),
        );
    }

    debug!(
        products = products.len(),
        collections = collections.len(),
        threshold,
        suggestions = suggestions.len(),
        "Ranked suggestions"
    );

    suggestions
}
