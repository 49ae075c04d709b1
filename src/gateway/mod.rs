//! HTTP gateway (Axum) exposing suggestion runs and manual assignment.
//!
//! This module is primarily used by the `autocollect` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    response::Response,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{apply_suggestion_handler, suggest_collections_handler};
pub use state::HandlerState;

use crate::catalog::CatalogConnector;
use handler::make_response;
use payload::HealthResponse;

pub const STATUS_HEALTHY: &str = "healthy";

pub fn create_router_with_state<K>(state: HandlerState<K>, cors_origins: &[String]) -> Router
where
    K: CatalogConnector,
{
    Router::new()
        .route("/", get(health_handler))
        .route("/healthz", get(health_handler))
        .route(
            "/api/suggest-collections",
            post(suggest_collections_handler::<K>),
        )
        .route("/api/apply-suggestion", post(apply_suggestion_handler::<K>))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allows the listed origins; unparsable entries are dropped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    make_response(
        StatusCode::OK,
        STATUS_HEALTHY,
        HealthResponse {
            status: "online".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}
