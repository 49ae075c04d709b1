use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{Instrument, info, instrument};

use crate::catalog::CatalogConnector;
use crate::constants::AUTOCOLLECT_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ApplyRequest, ApplyResponse, SuggestRequest, SuggestResponse};
use crate::gateway::state::HandlerState;
use crate::suggest::AssignmentEngine;

pub const STATUS_SUGGESTED: &str = "suggested";
pub const STATUS_APPLIED: &str = "applied";

#[instrument(skip(state, request), fields(run_id = tracing::field::Empty))]
pub async fn suggest_collections_handler<K>(
    State(state): State<HandlerState<K>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    K: CatalogConnector,
{
    let request: SuggestRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let catalog = state.connector.connect(request.store.as_ref())?;
    let engine = AssignmentEngine::new(catalog).with_call_timeout(state.call_timeout);

    let params = request.params;
    let result = tokio::spawn(async move { engine.run(&params).await }.in_current_span())
        .await
        .map_err(|e| GatewayError::InternalError(format!("Suggestion run aborted: {}", e)))??;
    tracing::Span::current().record("run_id", tracing::field::display(&result.run_id));

    info!(
        suggestions = result.stats.total_suggestions,
        applied = result.stats.total_applied,
        "Suggestions generated"
    );

    Ok(make_response(
        StatusCode::OK,
        STATUS_SUGGESTED,
        SuggestResponse::from(result),
    ))
}

#[instrument(skip(state, request))]
pub async fn apply_suggestion_handler<K>(
    State(state): State<HandlerState<K>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    K: CatalogConnector,
{
    let request: ApplyRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    if request.product_id.trim().is_empty() || request.collection_id.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "product_id and collection_id are required".to_string(),
        ));
    }

    let catalog = state.connector.connect(request.store.as_ref())?;
    let engine = AssignmentEngine::new(catalog).with_call_timeout(state.call_timeout);

    engine
        .apply_one(&request.product_id, &request.collection_id)
        .await?;

    info!(
        product_id = %request.product_id,
        collection_id = %request.collection_id,
        "Suggestion applied manually"
    );

    Ok(make_response(
        StatusCode::OK,
        STATUS_APPLIED,
        ApplyResponse {
            success: true,
            message: format!(
                "Product {} added to collection {}",
                request.product_id, request.collection_id
            ),
        },
    ))
}

pub(crate) fn make_response<T: Serialize>(
    status: StatusCode,
    autocollect_status: &'static str,
    body: T,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTOCOLLECT_STATUS_HEADER,
        HeaderValue::from_static(autocollect_status),
    );
    (status, headers, Json(body)).into_response()
}
