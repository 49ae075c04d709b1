//! Catalog fixtures shared by the integration tests.

use autocollect::{Collection, MockCatalog, Product};

/// Small apparel store: two exact title matches, one partial, one product with no match.
pub fn apparel_store() -> MockCatalog {
    MockCatalog::with_catalog(
        vec![
            Product::new("1", "Running Shoes"),
            Product::new("2", "Winter Coats"),
            Product::new("3", "Red Running Shoes"),
            Product::new("4", "Leather Wallet"),
        ],
        vec![
            Collection::custom("A", "Running Shoes"),
            Collection::custom("B", "Winter Coats"),
            Collection::smart("S", "Running Shoes"),
        ],
    )
}

const ADJECTIVES: &[&str] = &["red", "blue", "wool", "leather", "summer", "kids", "trail"];
const NOUNS: &[&str] = &["shoes", "coats", "socks", "wallet", "boots", "hats", "scarves"];

/// Deterministic pseudo-random catalog (no RNG dependency, same output for the same seed).
pub fn generated_store(seed: u64, products: usize, collections: usize) -> MockCatalog {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move |n: usize| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as usize) % n
    };

    let mut title = |words: usize| {
        (0..words)
            .map(|i| {
                if i % 2 == 0 {
                    ADJECTIVES[next(ADJECTIVES.len())]
                } else {
                    NOUNS[next(NOUNS.len())]
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let product_list = (0..products)
        .map(|i| Product::new(format!("{}", 1000 + i), title(2 + i % 3)))
        .collect();

    let collection_list = (0..collections)
        .map(|i| {
            let id = format!("{}", 9000 + i);
            if i % 4 == 3 {
                Collection::smart(id, title(2))
            } else {
                Collection::custom(id, title(1 + i % 2))
            }
        })
        .collect();

    MockCatalog::with_catalog(product_list, collection_list)
}
