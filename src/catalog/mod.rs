//! Catalog collaborators: data model, capability traits, and implementations.
//!
//! The suggestion engine only sees [`CatalogSource`] and [`AssignmentStore`]. The Shopify client
//! is the production implementation; [`MockCatalog`] is available for tests.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod shopify;
pub mod source;


pub use error::{CatalogError, CatalogResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCatalog, MockConnector};
pub use model::{Collection, CollectionKind, Product};
pub use shopify::{ShopifyClient, ShopifyConfig, ShopifyConnector};
pub use source::{AssignmentStore, CatalogConnector, CatalogSource, StoreCredentials};
