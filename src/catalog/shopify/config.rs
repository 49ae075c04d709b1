use std::time::Duration;

use crate::catalog::error::CatalogError;
use crate::catalog::source::StoreCredentials;
use crate::constants::{DEFAULT_API_VERSION, DEFAULT_RATE_LIMIT_BURST, DEFAULT_RATE_LIMIT_PER_SEC};

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries attempted after an HTTP 429 before giving up.
pub const MAX_THROTTLE_RETRIES: usize = 3;

/// Wait used when a 429 response carries no `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Longest `Retry-After` the client is willing to sleep for. Longer waits fail the call.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Upper bound on pages followed for a single listing.
pub const MAX_PAGES: usize = 10_000;

#[derive(Debug, Clone)]
/// Connection settings for one Shopify store.
pub struct ShopifyConfig {
    /// Store domain (`my-shop.myshopify.com`).
    pub shop_domain: String,
    /// Admin API access token.
    pub access_token: String,
    /// Admin API version.
    pub api_version: String,
    /// Overrides `https://{shop_domain}/admin/api/{api_version}` (tests, proxies).
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Sustained request rate.
    pub rate_limit_per_sec: f64,
    /// Token-bucket burst.
    pub rate_limit_burst: u32,
}

impl ShopifyConfig {
    pub fn new(shop_domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            rate_limit_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
        }
    }

    /// Builds a config from request credentials.
    pub fn from_credentials(store: &StoreCredentials) -> Self {
        let mut config = Self::new(store.shop_domain.clone(), store.access_token.clone());
        if let Some(version) = &store.api_version {
            config.api_version = version.clone();
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_rate_limit(mut self, per_sec: f64, burst: u32) -> Self {
        self.rate_limit_per_sec = per_sec;
        self.rate_limit_burst = burst;
        self
    }

    /// Returns the API root all endpoint paths are appended to.
    pub fn api_root(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}/admin/api/{}",
                self.shop_domain.trim_end_matches('/'),
                self.api_version
            ),
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.base_url.is_none() && self.shop_domain.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "shop_domain cannot be empty".to_string(),
            ));
        }
        if self.access_token.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "access_token cannot be empty".to_string(),
            ));
        }
        if !(self.rate_limit_per_sec > 0.0) || self.rate_limit_burst == 0 {
            return Err(CatalogError::NotConfigured(format!(
                "rate limit must be positive (got {}/s, burst {})",
                self.rate_limit_per_sec, self.rate_limit_burst
            )));
        }
        Ok(())
    }
}
