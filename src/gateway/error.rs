use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::constants::AUTOCOLLECT_STATUS_HEADER;
use crate::scoring::ScoringError;
use crate::suggest::RunError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("store not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    NotFound(String),

    #[error("catalog error: {0}")]
    Catalog(CatalogError),

    #[error("scoring failed: {0}")]
    ScoringFailed(#[from] ScoringError),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<CatalogError> for GatewayError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotConfigured(msg) => GatewayError::NotConfigured(msg),
            CatalogError::InvalidId { .. } => GatewayError::InvalidRequest(err.to_string()),
            other => GatewayError::Catalog(other),
        }
    }
}

impl From<RunError> for GatewayError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::NoProducts | RunError::NoCollections | RunError::NoEligibleCollections => {
                GatewayError::NotFound(err.to_string())
            }
            RunError::InvalidParams { reason } => GatewayError::InvalidRequest(reason),
            RunError::Catalog(e) => e.into(),
            RunError::Scoring(e) => GatewayError::ScoringFailed(e),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, autocollect_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotConfigured(_) => (StatusCode::BAD_REQUEST, "not_configured"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Catalog(_) => (StatusCode::BAD_GATEWAY, "catalog_error"),
            GatewayError::ScoringFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "scoring_error")
            }
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTOCOLLECT_STATUS_HEADER,
            HeaderValue::from_static(autocollect_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
