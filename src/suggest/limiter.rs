use std::cmp::Ordering;
use std::collections::HashMap;

use super::types::Suggestion;

/// Keeps at most `max_per_product` suggestions per product, highest confidence first.
///
/// The list is sorted globally (stable, descending confidence) before the walk, and the output
/// keeps that global order. Already-assigned suggestions compete for slots like any other.
pub fn limit_per_product(mut suggestions: Vec<Suggestion>, max_per_product: usize) -> Vec<Suggestion> {
    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept_per_product: HashMap<String, usize> = HashMap::new();
    suggestions.retain(|s| {
        let count = kept_per_product.entry(s.product_id.clone()).or_insert(0);
        if *count < max_per_product {
            *count += 1;
            true
        } else {
            false
        }
    });

    suggestions
}
