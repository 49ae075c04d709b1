use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::CatalogResult;
use super::model::{Collection, Product};

#[async_trait]
/// Read access to the catalog snapshot a run works on.
///
/// Implementations must return the *entire* catalog (all pages).
pub trait CatalogSource: Send + Sync {
    /// Fetches every product.
    async fn fetch_products(&self) -> CatalogResult<Vec<Product>>;

    /// Fetches every collection, tagged with its [`CollectionKind`](super::CollectionKind).
    async fn fetch_collections(&self) -> CatalogResult<Vec<Collection>>;
}

#[async_trait]
/// Query and write access to product/collection membership ("collects").
pub trait AssignmentStore: Send + Sync {
    /// Returns the ids of every collection `product_id` is already linked to.
    async fn assigned_collections(&self, product_id: &str) -> CatalogResult<HashSet<String>>;

    /// Links `product_id` into `collection_id`. `Ok(())` means the write was committed.
    async fn assign(&self, product_id: &str, collection_id: &str) -> CatalogResult<()>;

    /// Returns `true` if the link already exists.
    async fn is_assigned(&self, product_id: &str, collection_id: &str) -> CatalogResult<bool> {
        Ok(self
            .assigned_collections(product_id)
            .await?
            .contains(collection_id))
    }
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    async fn fetch_products(&self) -> CatalogResult<Vec<Product>> {
        (**self).fetch_products().await
    }

    async fn fetch_collections(&self) -> CatalogResult<Vec<Collection>> {
        (**self).fetch_collections().await
    }
}

#[async_trait]
impl<T: AssignmentStore + ?Sized> AssignmentStore for Arc<T> {
    async fn assigned_collections(&self, product_id: &str) -> CatalogResult<HashSet<String>> {
        (**self).assigned_collections(product_id).await
    }

    async fn assign(&self, product_id: &str, collection_id: &str) -> CatalogResult<()> {
        (**self).assign(product_id, collection_id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Credentials identifying one remote store.
pub struct StoreCredentials {
    /// Store domain, e.g. `my-shop.myshopify.com`.
    pub shop_domain: String,
    /// Admin API access token.
    pub access_token: String,
    /// Admin API version; falls back to the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl StoreCredentials {
    /// Creates credentials using the default API version.
    pub fn new(shop_domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            access_token: access_token.into(),
            api_version: None,
        }
    }
}

/// Builds a catalog handle for a store.
///
/// The gateway calls this once per request so that no client state (rate limiter, connection
/// pool) is shared between runs.
pub trait CatalogConnector: Send + Sync + 'static {
    /// Catalog handle type produced for each request.
    type Catalog: CatalogSource + AssignmentStore + 'static;

    /// Connects to `store`, or to the connector's default store when `None`.
    fn connect(&self, store: Option<&StoreCredentials>) -> CatalogResult<Self::Catalog>;
}
