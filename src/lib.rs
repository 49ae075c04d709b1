//! Autocollect library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`AssignmentEngine`], [`RunParams`], [`RunResult`] - Suggestion runs
//! - [`Product`], [`Collection`], [`CollectionKind`] - Catalog data model
//!
//! ## Catalog Collaborators
//! - [`CatalogSource`], [`AssignmentStore`], [`CatalogConnector`] - Capability traits
//! - [`ShopifyClient`], [`ShopifyConnector`] - Shopify Admin REST implementation
//!
//! ## Scoring
//! - [`TfIdfVectorizer`], [`cosine_similarity`] - Title similarity
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod scoring;
pub mod suggest;

pub use catalog::{
    AssignmentStore, CatalogConnector, CatalogError, CatalogResult, CatalogSource, Collection,
    CollectionKind, Product, ShopifyClient, ShopifyConfig, ShopifyConnector, StoreCredentials,
};
#[cfg(any(test, feature = "mock"))]
pub use catalog::{MockCatalog, MockConnector};

pub use config::{Config, ConfigError};
pub use constants::{
    AUTO_APPLY_MIN_CONFIDENCE, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_SUGGESTIONS_PER_PRODUCT,
};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use scoring::{ScoringError, TfIdfVectorizer, VectorizerConfig, cosine_similarity};

#[cfg(any(test, feature = "mock"))]
pub use suggest::RecordingObserver;
pub use suggest::{
    ApplyOutcome, AssignmentEngine, AutoApplyPolicy, RunError, RunEvent, RunObserver, RunParams,
    RunResult, RunStats, SkipReason, Stage, Suggestion, TracingObserver,
};
