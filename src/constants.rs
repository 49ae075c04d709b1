//! Cross-cutting, shared constants.
//!
//! Run defaults live here so the engine, the gateway payloads and the tests agree on them.
//!
//! # Confidence Bars
//!
//! Two bars gate a suggestion. [`DEFAULT_CONFIDENCE_THRESHOLD`] is a per-run parameter that
//! decides what gets *surfaced*. [`AUTO_APPLY_MIN_CONFIDENCE`] is fixed and decides what may be
//! *committed* without review; it is compared with `>` while the ranking threshold uses `>=`.

/// Default ranking threshold (suggestions need `confidence >= threshold`).
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Default cap on suggestions kept per product.
pub const DEFAULT_MAX_SUGGESTIONS_PER_PRODUCT: usize = 3;

/// Auto-apply bar (strict `>`). Not configurable.
pub const AUTO_APPLY_MIN_CONFIDENCE: f64 = 0.80;

/// Default vocabulary cap for the TF-IDF vectorizer.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Upper n-gram length used by the vectorizer (unigrams + bigrams).
pub const DEFAULT_NGRAM_MAX: usize = 2;

/// Default timeout applied to every collaborator call made by the engine.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Shopify Admin REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2025-01";

/// Largest page size accepted by the Shopify REST endpoints.
pub const SHOPIFY_PAGE_LIMIT: u32 = 250;

/// Default sustained request rate towards the catalog service.
pub const DEFAULT_RATE_LIMIT_PER_SEC: f64 = 2.0;

/// Default token-bucket burst size.
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 2;

/// Header carrying the gateway outcome on every response.
pub const AUTOCOLLECT_STATUS_HEADER: &str = "x-autocollect-status";
