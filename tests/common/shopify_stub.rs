//! In-memory Shopify Admin API stand-in, served over real HTTP.

use std::collections::HashMap;
use std::sync::Arc;

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
use tokio::task::JoinHandle;

pub const STUB_TOKEN: &str = "shpat_stub";

#[derive(Default)]
struct Shop {
    products: Vec<(u64, String)>,
    custom: Vec<(u64, String)>,
    smart: Vec<(u64, String)>,
    collects: Vec<(u64, u64)>,
}

#[derive(Clone)]
struct StubState {
    base: String,
    shop: Arc<Mutex<Shop>>,
}

pub struct ShopifyStub {
    base: String,
    shop: Arc<Mutex<Shop>>,
    handle: JoinHandle<()>,
}

impl ShopifyStub {
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn collects(&self) -> Vec<(u64, u64)> {
        self.shop.lock().collects.clone()
    }
}

impl Drop for ShopifyStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Products are served two per page so pagination is always exercised.
const PRODUCTS_PER_PAGE: usize = 2;

pub async fn spawn_shopify_stub(
    products: &[(u64, &str)],
    custom: &[(u64, &str)],
    smart: &[(u64, &str)],
    collects: &[(u64, u64)],
) -> anyhow::Result<ShopifyStub> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base = format!("http://{}", listener.local_addr()?);

    let owned = |items: &[(u64, &str)]| {
        items
            .iter()
            .map(|(id, title)| (*id, title.to_string()))
            .collect::<Vec<_>>()
    };
    let shop = Arc::new(Mutex::new(Shop {
        products: owned(products),
        custom: owned(custom),
        smart: owned(smart),
        collects: collects.to_vec(),
    }));

    let state = StubState {
        base: base.clone(),
        shop: shop.clone(),
    };
    let app = Router::new()
        .route("/products.json", get(list_products))
        .route("/custom_collections.json", get(list_custom))
        .route("/smart_collections.json", get(list_smart))
        .route("/collects.json", get(list_collects).post(create_collect))
        .with_state(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("shopify stub exited: {e}");
        }
    });

    Ok(ShopifyStub { base, shop, handle })
}

fn unauthorized(headers: &HeaderMap) -> Option<Response> {
    let token = headers
        .get("x-shopify-access-token")
        .and_then(|v| v.to_str().ok());
    if token == Some(STUB_TOKEN) {
        None
    } else {
        Some(
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"errors": "[API] Invalid API key or access token"})),
            )
                .into_response(),
        )
    }
}

fn records(items: &[(u64, String)]) -> Vec<Value> {
    items
        .iter()
        .map(|(id, title)| json!({"id": id, "title": title}))
        .collect()
}

async fn list_products(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }

    let page: usize = query
        .get("page_info")
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    let shop = state.shop.lock();
    let start = page * PRODUCTS_PER_PAGE;
    let end = (start + PRODUCTS_PER_PAGE).min(shop.products.len());
    let batch = records(shop.products.get(start..end).unwrap_or_default());

    let body = Json(json!({"products": batch}));
    if end < shop.products.len() {
        let link = format!(
            "<{}/products.json?page_info={}&limit=250>; rel=\"next\"",
            state.base,
            page + 1
        );
        ([(header::LINK, link)], body).into_response()
    } else {
        body.into_response()
    }
}

async fn list_custom(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let shop = state.shop.lock();
    Json(json!({"custom_collections": records(&shop.custom)})).into_response()
}

async fn list_smart(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let shop = state.shop.lock();
    Json(json!({"smart_collections": records(&shop.smart)})).into_response()
}

async fn list_collects(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let product_id: Option<u64> = query.get("product_id").and_then(|p| p.parse().ok());
    let shop = state.shop.lock();
    let collects: Vec<Value> = shop
        .collects
        .iter()
        .filter(|(p, _)| Some(*p) == product_id)
        .map(|(p, c)| json!({"product_id": p, "collection_id": c}))
        .collect();
    Json(json!({"collects": collects})).into_response()
}

async fn create_collect(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let product_id = body["collect"]["product_id"].as_u64();
    let collection_id = body["collect"]["collection_id"].as_u64();

    let (Some(product_id), Some(collection_id)) = (product_id, collection_id) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": {"collect": ["is invalid"]}})),
        )
            .into_response();
    };

    let mut shop = state.shop.lock();
    if !shop.custom.iter().any(|(id, _)| *id == collection_id) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": {"collection_id": ["is not a custom collection"]}})),
        )
            .into_response();
    }
    shop.collects.push((product_id, collection_id));

    (
        StatusCode::CREATED,
        Json(json!({"collect": {"product_id": product_id, "collection_id": collection_id}})),
    )
        .into_response()
}
