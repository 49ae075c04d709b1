use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use super::client::retry_after;
use super::config::{DEFAULT_RETRY_AFTER, MAX_RETRY_AFTER};
use super::wire::CreateCollectRequest;
use super::*;
use crate::catalog::{
    AssignmentStore, CatalogConnector, CatalogError, CatalogSource, CollectionKind,
    StoreCredentials,
};
use crate::config::Config;
use crate::suggest::{AssignmentEngine, RunParams};

// ---------------------------------------------------------------------------
// Local Shopify stub
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Stub {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
    posted: Arc<Mutex<Vec<Value>>>,
    throttle_collects: Arc<AtomicUsize>,
    retry_after: Option<&'static str>,
    fail_smart: bool,
    self_link: bool,
}

impl Stub {
    fn record(&self, entry: impl Into<String>) {
        self.requests.lock().push(entry.into());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-shopify-access-token")
        .and_then(|v| v.to_str().ok())
        == Some("shpat_test")
}

async fn products(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }

    match query.get("page_info").map(String::as_str) {
        None => {
            stub.record(format!(
                "products limit={} fields={}",
                query.get("limit").map(String::as_str).unwrap_or_default(),
                query.get("fields").map(String::as_str).unwrap_or_default(),
            ));
            let link = format!(
                "<{}/products.json?page_info=p2&limit=250>; rel=\"next\"",
                stub.base
            );
            (
                [(header::LINK, link)],
                Json(json!({"products": [
                    {"id": 1, "title": "Red Running Shoes"},
                    {"id": 2, "title": "Winter Coat"}
                ]})),
            )
                .into_response()
        }
        Some(page) => {
            stub.record(format!("products page_info={page}"));
            let rel = if stub.self_link { "next" } else { "previous" };
            let target = if stub.self_link { "p2" } else { "p1" };
            let link = format!(
                "<{}/products.json?page_info={target}&limit=250>; rel=\"{rel}\"",
                stub.base
            );
            (
                [(header::LINK, link)],
                Json(json!({"products": [{"id": 3, "title": "Leather Wallet"}]})),
            )
                .into_response()
        }
    }
}

async fn custom_collections(State(stub): State<Stub>) -> Response {
    stub.record("custom_collections");
    Json(json!({"custom_collections": [{"id": 10, "title": "Running Shoes"}]})).into_response()
}

async fn smart_collections(State(stub): State<Stub>) -> Response {
    stub.record("smart_collections");
    if stub.fail_smart {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({"smart_collections": [{"id": 20, "title": "On Sale"}]})).into_response()
}

async fn list_collects(
    State(stub): State<Stub>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    stub.record(format!(
        "collects product_id={}",
        query.get("product_id").map(String::as_str).unwrap_or_default()
    ));

    let throttled = stub
        .throttle_collects
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if throttled {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, stub.retry_after.unwrap_or("0"))],
            "Exceeded 2 calls per second for api client",
        )
            .into_response();
    }

    Json(json!({"collects": [{"collection_id": 10}, {"collection_id": 11}]})).into_response()
}

async fn create_collect(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.record("create_collect");
    stub.posted.lock().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn spawn_stub(mut stub: Stub) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    stub.base = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/products.json", get(products))
        .route("/custom_collections.json", get(custom_collections))
        .route("/smart_collections.json", get(smart_collections))
        .route("/collects.json", get(list_collects).post(create_collect))
        .with_state(stub.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    stub
}

fn client_for(stub: &Stub) -> ShopifyClient {
    let config = ShopifyConfig::new("test.myshopify.com", "shpat_test")
        .with_base_url(stub.base.clone())
        .with_rate_limit(1000.0, 100);
    ShopifyClient::new(config).unwrap()
}

// ---------------------------------------------------------------------------
// Client against the stub
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_products_follows_pagination() {
    let stub = spawn_stub(Stub::default()).await;
    let client = client_for(&stub);

    let products = client.fetch_products().await.unwrap();

    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(products[0].title, "Red Running Shoes");
    assert_eq!(
        stub.requests(),
        vec!["products limit=250 fields=id,title", "products page_info=p2"]
    );
}

#[tokio::test]
async fn test_fetch_collections_custom_first() {
    let stub = spawn_stub(Stub::default()).await;
    let client = client_for(&stub);

    let collections = client.fetch_collections().await.unwrap();

    assert_eq!(collections.len(), 2);
    assert_eq!(collections[0].id, "10");
    assert_eq!(collections[0].kind, CollectionKind::Custom);
    assert_eq!(collections[1].id, "20");
    assert_eq!(collections[1].kind, CollectionKind::Smart);
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let stub = spawn_stub(Stub {
        fail_smart: true,
        ..Default::default()
    })
    .await;
    let client = client_for(&stub);

    let err = client.fetch_collections().await.unwrap_err();

    assert_eq!(
        err,
        CatalogError::Http {
            status: 500,
            body: "boom".to_string()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_missing_token_is_http_401() {
    let stub = spawn_stub(Stub::default()).await;
    let config = ShopifyConfig::new("test.myshopify.com", "wrong")
        .with_base_url(stub.base.clone())
        .with_rate_limit(1000.0, 100);
    let client = ShopifyClient::new(config).unwrap();

    let err = client.fetch_products().await.unwrap_err();

    assert!(matches!(err, CatalogError::Http { status: 401, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_assigned_collections_retries_throttling() {
    let stub = spawn_stub(Stub::default()).await;
    stub.throttle_collects.store(2, Ordering::SeqCst);
    let client = client_for(&stub);

    let assigned = client.assigned_collections("1").await.unwrap();

    assert!(assigned.contains("10"));
    assert!(assigned.contains("11"));
    assert_eq!(stub.requests().len(), 3);
    assert!(client.is_assigned("1", "10").await.unwrap());
    assert!(!client.is_assigned("1", "99").await.unwrap());
}

#[tokio::test]
async fn test_throttling_gives_up_after_retries() {
    let stub = spawn_stub(Stub::default()).await;
    stub.throttle_collects.store(100, Ordering::SeqCst);
    let client = client_for(&stub);

    let err = client.assigned_collections("1").await.unwrap_err();

    assert_eq!(
        err,
        CatalogError::RateLimited {
            retry_after: Duration::ZERO
        }
    );
    // One attempt plus three retries.
    assert_eq!(stub.requests().len(), 4);
}

#[tokio::test]
async fn test_oversized_retry_after_fails_without_waiting() {
    let stub = spawn_stub(Stub {
        retry_after: Some("1e30"),
        ..Default::default()
    })
    .await;
    stub.throttle_collects.store(100, Ordering::SeqCst);
    let client = client_for(&stub);

    let started = Instant::now();
    let err = client.assigned_collections("1").await.unwrap_err();

    assert!(matches!(
        err,
        CatalogError::RateLimited { retry_after } if retry_after > MAX_RETRY_AFTER
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn test_throttled_status_lookup_degrades_in_a_run() {
    let stub = spawn_stub(Stub {
        retry_after: Some("1e30"),
        ..Default::default()
    })
    .await;
    stub.throttle_collects.store(100, Ordering::SeqCst);
    let client = Arc::new(client_for(&stub));

    let result = AssignmentEngine::new(client)
        .run(&RunParams::default().with_threshold(0.3))
        .await
        .unwrap();

    assert!(!result.suggestions.is_empty());
    assert!(result.suggestions.iter().all(|s| !s.already_assigned));
}

#[test]
fn test_retry_after_parsing() {
    let headers = |value: &str| {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, value.parse().unwrap());
        headers
    };

    assert_eq!(retry_after(&headers("2.5")), Duration::from_millis(2500));
    assert_eq!(retry_after(&headers("1e30")), Duration::MAX);
    assert_eq!(retry_after(&headers("inf")), Duration::MAX);
    assert_eq!(retry_after(&headers("NaN")), DEFAULT_RETRY_AFTER);
    assert_eq!(retry_after(&headers("-1")), DEFAULT_RETRY_AFTER);
    assert_eq!(retry_after(&reqwest::header::HeaderMap::new()), DEFAULT_RETRY_AFTER);
}

#[tokio::test]
async fn test_pagination_stops_on_repeated_next_link() {
    let stub = spawn_stub(Stub {
        self_link: true,
        ..Default::default()
    })
    .await;
    let client = client_for(&stub);

    let err = client.fetch_products().await.unwrap_err();

    assert_eq!(err.kind(), "decode");
    assert_eq!(
        stub.requests(),
        vec!["products limit=250 fields=id,title", "products page_info=p2"]
    );
}

#[tokio::test]
async fn test_assign_posts_numeric_ids() {
    let stub = spawn_stub(Stub::default()).await;
    let client = client_for(&stub);

    client.assign("1", "10").await.unwrap();

    assert_eq!(
        stub.posted.lock().clone(),
        vec![json!({"collect": {"product_id": 1, "collection_id": 10}})]
    );
}

#[tokio::test]
async fn test_non_numeric_ids_never_reach_the_wire() {
    let stub = spawn_stub(Stub::default()).await;
    let client = client_for(&stub);

    let err = client.assign("gid://shopify/Product/1", "10").await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidId {
            field: "product_id",
            ..
        }
    ));

    let err = client.assigned_collections("abc").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidId { .. }));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let config = ShopifyConfig::new("test.myshopify.com", "shpat_test").with_base_url(base);
    let client = ShopifyClient::new(config).unwrap();

    let err = client.fetch_products().await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

// ---------------------------------------------------------------------------
// Pagination header, wire payloads, rate limiter
// ---------------------------------------------------------------------------

#[test]
fn test_next_page_url() {
    let header = "<https://x.myshopify.com/admin/api/2025-01/products.json?page_info=abc&limit=250>; rel=\"next\"";
    assert_eq!(
        next_page_url(header).as_deref(),
        Some("https://x.myshopify.com/admin/api/2025-01/products.json?page_info=abc&limit=250")
    );

    let both = "<https://x/p.json?page_info=a>; rel=\"previous\", <https://x/p.json?page_info=b>; rel=\"next\"";
    assert_eq!(
        next_page_url(both).as_deref(),
        Some("https://x/p.json?page_info=b")
    );

    assert_eq!(next_page_url("<https://x/p.json?page_info=a>; rel=\"previous\""), None);
    assert_eq!(next_page_url(""), None);
}

#[test]
fn test_create_collect_request() {
    let body = CreateCollectRequest::new(" 42 ", "7").unwrap();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({"collect": {"product_id": 42, "collection_id": 7}})
    );

    assert!(matches!(
        CreateCollectRequest::new("1", "-3"),
        Err(CatalogError::InvalidId {
            field: "collection_id",
            ..
        })
    ));
}

#[test]
fn test_token_bucket_burst_then_waits() {
    let bucket = TokenBucket::new(2.0, 2);
    let now = Instant::now();

    assert_eq!(bucket.reserve(now), Duration::ZERO);
    assert_eq!(bucket.reserve(now), Duration::ZERO);
    assert_eq!(bucket.reserve(now), Duration::from_millis(500));
    assert_eq!(bucket.reserve(now), Duration::from_millis(1000));
    assert!(bucket.available() < 0.0);
}

#[test]
fn test_token_bucket_refills_up_to_burst() {
    let bucket = TokenBucket::new(2.0, 2);
    let start = Instant::now();

    bucket.reserve(start);
    bucket.reserve(start);

    // Long idle period refills only up to capacity.
    let later = start + Duration::from_secs(60);
    assert_eq!(bucket.reserve(later), Duration::ZERO);
    assert_eq!(bucket.reserve(later), Duration::ZERO);
    assert!(bucket.reserve(later) > Duration::ZERO);
}

// ---------------------------------------------------------------------------
// Config and connector
// ---------------------------------------------------------------------------

#[test]
fn test_api_root() {
    let config = ShopifyConfig::new("demo.myshopify.com", "t");
    assert_eq!(config.api_root(), "https://demo.myshopify.com/admin/api/2025-01");

    let config = config.with_base_url("http://127.0.0.1:9999/");
    assert_eq!(config.api_root(), "http://127.0.0.1:9999");
}

#[test]
fn test_config_validation() {
    assert!(matches!(
        ShopifyConfig::new("", "token").validate(),
        Err(CatalogError::NotConfigured(_))
    ));
    assert!(ShopifyConfig::new("demo.myshopify.com", " ").validate().is_err());
    assert!(
        ShopifyConfig::new("demo.myshopify.com", "token")
            .with_rate_limit(0.0, 2)
            .validate()
            .is_err()
    );
    assert_eq!(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs(30));
}

#[test]
fn test_connector_without_store_is_not_configured() {
    let connector = ShopifyConnector::from_config(&Config::default());

    assert!(matches!(
        connector.connect(None),
        Err(CatalogError::NotConfigured(_))
    ));
}

#[test]
fn test_connector_prefers_request_store() {
    let config = Config {
        shop_domain: Some("default.myshopify.com".to_string()),
        access_token: Some("shpat_default".to_string()),
        api_version: "2024-10".to_string(),
        ..Default::default()
    };
    let connector = ShopifyConnector::from_config(&config);

    let default = connector.client_config(None).unwrap();
    assert_eq!(default.shop_domain, "default.myshopify.com");
    assert_eq!(default.api_version, "2024-10");

    let store = StoreCredentials::new("other.myshopify.com", "shpat_other");
    let chosen = connector.client_config(Some(&store)).unwrap();
    assert_eq!(chosen.shop_domain, "other.myshopify.com");
    assert_eq!(chosen.access_token, "shpat_other");
    // Request without a version inherits the server's.
    assert_eq!(chosen.api_version, "2024-10");
    assert_eq!(chosen.request_timeout, Duration::from_secs(30));

    let client = connector
        .with_base_url("http://127.0.0.1:1")
        .connect(Some(&store))
        .unwrap();
    assert_eq!(client.api_root(), "http://127.0.0.1:1");
}
