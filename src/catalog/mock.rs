use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{CatalogError, CatalogResult};
use super::model::{Collection, Product};
use super::source::{AssignmentStore, CatalogConnector, CatalogSource, StoreCredentials};

#[derive(Default)]
struct MockState {
    products: Vec<Product>,
    collections: Vec<Collection>,
    links: HashMap<String, HashSet<String>>,
    failing_lookups: HashSet<String>,
    failing_assigns: HashSet<(String, String)>,
    fail_fetch: Option<CatalogError>,
    lookup_delay: Option<Duration>,
    lookup_calls: usize,
    assign_calls: Vec<(String, String)>,
}

/// In-memory catalog used by tests and the `mock` feature.
///
/// Clones share state, so a test can keep a handle while the engine owns another.
#[derive(Clone, Default)]
pub struct MockCatalog {
    state: Arc<RwLock<MockState>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(products: Vec<Product>, collections: Vec<Collection>) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state.write();
            state.products = products;
            state.collections = collections;
        }
        mock
    }

    /// Records an existing link, as if it had been created before the run.
    pub fn link(&self, product_id: &str, collection_id: &str) {
        self.state
            .write()
            .links
            .entry(product_id.to_string())
            .or_default()
            .insert(collection_id.to_string());
    }

    /// Makes every status lookup for `product_id` fail with a transport error.
    pub fn fail_lookups_for(&self, product_id: &str) {
        self.state
            .write()
            .failing_lookups
            .insert(product_id.to_string());
    }

    /// Makes `assign(product_id, collection_id)` fail with an HTTP 422.
    pub fn fail_assign_for(&self, product_id: &str, collection_id: &str) {
        self.state
            .write()
            .failing_assigns
            .insert((product_id.to_string(), collection_id.to_string()));
    }

    /// Makes both fetch calls fail with `error`.
    pub fn fail_fetch_with(&self, error: CatalogError) {
        self.state.write().fail_fetch = Some(error);
    }

    /// Delays every status lookup (used to exercise call timeouts).
    pub fn delay_lookups(&self, delay: Duration) {
        self.state.write().lookup_delay = Some(delay);
    }

    pub fn is_linked(&self, product_id: &str, collection_id: &str) -> bool {
        self.state
            .read()
            .links
            .get(product_id)
            .is_some_and(|set| set.contains(collection_id))
    }

    pub fn lookup_calls(&self) -> usize {
        self.state.read().lookup_calls
    }

    pub fn assign_calls(&self) -> Vec<(String, String)> {
        self.state.read().assign_calls.clone()
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    async fn fetch_products(&self) -> CatalogResult<Vec<Product>> {
        let state = self.state.read();
        if let Some(err) = &state.fail_fetch {
            return Err(err.clone());
        }
        Ok(state.products.clone())
    }

    async fn fetch_collections(&self) -> CatalogResult<Vec<Collection>> {
        let state = self.state.read();
        if let Some(err) = &state.fail_fetch {
            return Err(err.clone());
        }
        Ok(state.collections.clone())
    }
}

#[async_trait]
impl AssignmentStore for MockCatalog {
    async fn assigned_collections(&self, product_id: &str) -> CatalogResult<HashSet<String>> {
        let delay = {
            let mut state = self.state.write();
            state.lookup_calls += 1;
            state.lookup_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read();
        if state.failing_lookups.contains(product_id) {
            return Err(CatalogError::Transport("connection reset by peer".to_string()));
        }

        Ok(state.links.get(product_id).cloned().unwrap_or_default())
    }

    async fn assign(&self, product_id: &str, collection_id: &str) -> CatalogResult<()> {
        let mut state = self.state.write();
        state
            .assign_calls
            .push((product_id.to_string(), collection_id.to_string()));

        if state
            .failing_assigns
            .contains(&(product_id.to_string(), collection_id.to_string()))
        {
            return Err(CatalogError::Http {
                status: 422,
                body: "collection_id is invalid".to_string(),
            });
        }

        state
            .links
            .entry(product_id.to_string())
            .or_default()
            .insert(collection_id.to_string());
        Ok(())
    }
}

/// Connector handing out clones of one [`MockCatalog`], whatever store is requested.
#[derive(Clone, Default)]
pub struct MockConnector {
    catalog: MockCatalog,
    require_store: bool,
}

impl MockConnector {
    pub fn new(catalog: MockCatalog) -> Self {
        Self {
            catalog,
            require_store: false,
        }
    }

    /// Rejects requests that carry no store credentials (mirrors an unconfigured server).
    pub fn requiring_store(mut self) -> Self {
        self.require_store = true;
        self
    }

    pub fn catalog(&self) -> &MockCatalog {
        &self.catalog
    }
}

impl CatalogConnector for MockConnector {
    type Catalog = MockCatalog;

    fn connect(&self, store: Option<&StoreCredentials>) -> CatalogResult<MockCatalog> {
        if self.require_store && store.is_none() {
            return Err(CatalogError::NotConfigured(
                "no store in request and no default store".to_string(),
            ));
        }
        Ok(self.catalog.clone())
    }
}
