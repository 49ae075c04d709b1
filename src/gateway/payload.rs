use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::StoreCredentials;
use crate::suggest::{RunParams, RunResult, RunStats, Suggestion};

#[derive(Deserialize, Debug, Clone)]
pub struct SuggestRequest {
    /// Target store; the server's default store is used when absent.
    #[serde(default)]
    pub store: Option<StoreCredentials>,

    #[serde(flatten)]
    pub params: RunParams,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SuggestResponse {
    pub success: bool,
    pub run_id: Uuid,
    pub suggestions: Vec<Suggestion>,
    pub applied: Vec<Suggestion>,
    pub stats: RunStats,
}

impl From<RunResult> for SuggestResponse {
    fn from(result: RunResult) -> Self {
        Self {
            success: true,
            run_id: result.run_id,
            suggestions: result.suggestions,
            applied: result.applied,
            stats: result.stats,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplyRequest {
    #[serde(default)]
    pub store: Option<StoreCredentials>,
    pub product_id: String,
    pub collection_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplyResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
