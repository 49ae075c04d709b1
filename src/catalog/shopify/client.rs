use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::config::{
    DEFAULT_RETRY_AFTER, MAX_PAGES, MAX_RETRY_AFTER, MAX_THROTTLE_RETRIES, ShopifyConfig,
};
use super::rate_limit::TokenBucket;
use super::wire::{
    CollectsPage, CreateCollectRequest, CustomCollectionsPage, ProductsPage,
    SmartCollectionsPage, next_page_url,
};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::model::{Collection, CollectionKind, Product};
use crate::catalog::source::{AssignmentStore, CatalogSource};
use crate::constants::SHOPIFY_PAGE_LIMIT;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Shopify Admin REST client.
///
/// Owns its HTTP connection pool and its rate limiter; nothing is process-global.
pub struct ShopifyClient {
    http: HttpClient,
    config: ShopifyConfig,
    api_root: String,
    limiter: TokenBucket,
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("api_root", &self.api_root)
            .field("rate_limit_per_sec", &self.config.rate_limit_per_sec)
            .finish()
    }
}

impl ShopifyClient {
    /// Creates a client for `config`.
    pub fn new(config: ShopifyConfig) -> CatalogResult<Self> {
        config.validate()?;

        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_root: config.api_root(),
            limiter: TokenBucket::new(config.rate_limit_per_sec, config.rate_limit_burst),
            config,
        })
    }

    /// Returns the API root requests are sent to.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    /// Sends a request built by `build`, honouring the rate limiter and retrying on HTTP 429.
    ///
    /// A throttled request is only retried when the advertised wait is at most
    /// [`MAX_RETRY_AFTER`]; otherwise it fails with [`CatalogError::RateLimited`] at once.
    async fn send<F>(&self, operation: &'static str, build: F) -> CatalogResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut throttled = 0usize;
        loop {
            self.limiter.acquire().await;

            let response = build()
                .header(ACCESS_TOKEN_HEADER, &self.config.access_token)
                .send()
                .await
                .map_err(|e| self.map_transport_error(operation, e))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after(response.headers());
                if throttled < MAX_THROTTLE_RETRIES && retry_after <= MAX_RETRY_AFTER {
                    throttled += 1;
                    warn!(
                        operation,
                        attempt = throttled,
                        retry_after_ms = retry_after.as_millis() as u64,
                        "Catalog throttled request, backing off"
                    );
                    tokio::time::sleep(retry_after).await;
                    continue;
                }
                return Err(CatalogError::RateLimited { retry_after });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::Http {
                    status: status.as_u16(),
                    body: truncate(body),
                });
            }

            return Ok(response);
        }
    }

    /// GETs `path` and every page linked after it, flattening items with `extract`.
    async fn get_all_pages<P, T, E>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
        extract: E,
    ) -> CatalogResult<Vec<T>>
    where
        P: DeserializeOwned,
        E: Fn(P) -> Vec<T>,
    {
        let mut items = Vec::new();
        let mut next: Option<String> = None;
        let mut visited: HashSet<String> = HashSet::new();
        let mut page = 0usize;

        loop {
            page += 1;
            if page > MAX_PAGES {
                return Err(CatalogError::Decode(format!(
                    "{operation}: more than {MAX_PAGES} pages"
                )));
            }

            let response = match &next {
                None => {
                    let url = self.endpoint(path);
                    self.send(operation, || self.http.get(&url).query(query))
                        .await?
                }
                Some(url) => self.send(operation, || self.http.get(url)).await?,
            };
            visited.insert(response.url().as_str().to_string());

            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url)
                .map(normalize_url);

            if let Some(url) = next.as_deref().filter(|url| visited.contains(*url)) {
                return Err(CatalogError::Decode(format!(
                    "{operation}: pagination revisits {url}"
                )));
            }

            let body: P = response
                .json()
                .await
                .map_err(|e| CatalogError::Decode(format!("{operation}: {e}")))?;
            let batch = extract(body);

            debug!(operation, page, batch = batch.len(), has_next = next.is_some(), "Fetched page");
            items.extend(batch);

            if next.is_none() {
                break;
            }
        }

        Ok(items)
    }

    fn map_transport_error(&self, operation: &'static str, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout {
                operation,
                elapsed: self.config.request_timeout,
            }
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl CatalogSource for ShopifyClient {
    async fn fetch_products(&self) -> CatalogResult<Vec<Product>> {
        let products = self
            .get_all_pages(
                "fetch_products",
                "products.json",
                &[
                    ("limit", SHOPIFY_PAGE_LIMIT.to_string()),
                    ("fields", "id,title".to_string()),
                ],
                |page: ProductsPage| {
                    page.products
                        .into_iter()
                        .map(Product::from)
                        .collect::<Vec<_>>()
                },
            )
            .await?;

        info!(count = products.len(), "Fetched products");
        Ok(products)
    }

    async fn fetch_collections(&self) -> CatalogResult<Vec<Collection>> {
        let query = [("limit", SHOPIFY_PAGE_LIMIT.to_string())];

        let mut collections = self
            .get_all_pages(
                "fetch_custom_collections",
                "custom_collections.json",
                &query,
                |page: CustomCollectionsPage| {
                    page.custom_collections
                        .into_iter()
                        .map(|c| c.into_collection(CollectionKind::Custom))
                        .collect::<Vec<_>>()
                },
            )
            .await?;
        let custom = collections.len();

        let smart = self
            .get_all_pages(
                "fetch_smart_collections",
                "smart_collections.json",
                &query,
                |page: SmartCollectionsPage| {
                    page.smart_collections
                        .into_iter()
                        .map(|c| c.into_collection(CollectionKind::Smart))
                        .collect::<Vec<_>>()
                },
            )
            .await?;
        collections.extend(smart);

        info!(
            total = collections.len(),
            custom,
            smart = collections.len() - custom,
            "Fetched collections"
        );
        Ok(collections)
    }
}

#[async_trait]
impl AssignmentStore for ShopifyClient {
    async fn assigned_collections(&self, product_id: &str) -> CatalogResult<HashSet<String>> {
        let id: u64 = product_id
            .trim()
            .parse()
            .map_err(|_| CatalogError::InvalidId {
                field: "product_id",
                value: product_id.to_string(),
            })?;

        let ids = self
            .get_all_pages(
                "assigned_collections",
                "collects.json",
                &[
                    ("product_id", id.to_string()),
                    ("limit", SHOPIFY_PAGE_LIMIT.to_string()),
                ],
                |page: CollectsPage| {
                    page.collects
                        .into_iter()
                        .map(|c| c.collection_id.to_string())
                        .collect::<Vec<_>>()
                },
            )
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn assign(&self, product_id: &str, collection_id: &str) -> CatalogResult<()> {
        let body = CreateCollectRequest::new(product_id, collection_id)?;
        let url = self.endpoint("collects.json");

        self.send("assign", || self.http.post(&url).json(&body))
            .await?;

        debug!(product_id, collection_id, "Collect created");
        Ok(())
    }
}

/// Reads `Retry-After` as seconds. Values too large for a `Duration` saturate.
pub(super) fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| *secs >= 0.0)
        .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Canonical form of a link target, so it compares equal to the URL reqwest reports.
fn normalize_url(url: String) -> String {
    match reqwest::Url::parse(&url) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => url,
    }
}

fn truncate(mut body: String) -> String {
    if let Some((idx, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        body.truncate(idx);
        body.push('…');
    }
    body
}
