use std::time::Duration;

use super::client::ShopifyClient;
use super::config::ShopifyConfig;
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::source::{CatalogConnector, StoreCredentials};
use crate::config::Config;

/// Builds a fresh [`ShopifyClient`] per request from server-wide defaults.
#[derive(Debug, Clone)]
pub struct ShopifyConnector {
    default_store: Option<StoreCredentials>,
    api_version: String,
    request_timeout: Duration,
    rate_limit_per_sec: f64,
    rate_limit_burst: u32,
    base_url: Option<String>,
}

impl ShopifyConnector {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_store: config.default_store(),
            api_version: config.api_version.clone(),
            request_timeout: config.request_timeout(),
            rate_limit_per_sec: config.rate_limit_per_sec,
            rate_limit_burst: config.rate_limit_burst,
            base_url: None,
        }
    }

    /// Sends every request to `base_url` instead of the store's domain.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Resolves the client config for `store` (or the default store).
    pub fn client_config(&self, store: Option<&StoreCredentials>) -> CatalogResult<ShopifyConfig> {
        let store = store.or(self.default_store.as_ref()).ok_or_else(|| {
            CatalogError::NotConfigured(
                "no store credentials in request and no default store configured".to_string(),
            )
        })?;

        let mut config = ShopifyConfig::from_credentials(store)
            .with_request_timeout(self.request_timeout)
            .with_rate_limit(self.rate_limit_per_sec, self.rate_limit_burst);
        if store.api_version.is_none() {
            config.api_version = self.api_version.clone();
        }
        config.base_url = self.base_url.clone();

        Ok(config)
    }
}

impl CatalogConnector for ShopifyConnector {
    type Catalog = ShopifyClient;

    fn connect(&self, store: Option<&StoreCredentials>) -> CatalogResult<ShopifyClient> {
        ShopifyClient::new(self.client_config(store)?)
    }
}
