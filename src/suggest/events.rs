//! Run progress events.
//!
//! The engine reports progress through a [`RunObserver`] instead of printing. The default
//! [`TracingObserver`] forwards events to `tracing`; tests use [`RecordingObserver`].

use uuid::Uuid;

use super::apply::SkipReason;
use crate::catalog::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pipeline stages, in execution order.
pub enum Stage {
    FetchCatalog,
    Rank,
    ResolveStatus,
    Limit,
    AutoApply,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::FetchCatalog => "fetch_catalog",
            Stage::Rank => "rank",
            Stage::ResolveStatus => "resolve_status",
            Stage::Limit => "limit",
            Stage::AutoApply => "auto_apply",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    StageStarted {
        stage: Stage,
    },
    /// `items` is the stage's output size (suggestions, or products for the fetch stage).
    StageCompleted {
        stage: Stage,
        items: usize,
    },
    /// Status lookup failed; the product's suggestions are treated as not assigned.
    StatusLookupFailed {
        product_id: String,
        error: CatalogError,
    },
    SuggestionApplied {
        product_id: String,
        collection_id: String,
        confidence: f64,
    },
    SuggestionSkipped {
        product_id: String,
        collection_id: String,
        reason: SkipReason,
    },
}

/// Receives events emitted during a run.
pub trait RunObserver: Send + Sync {
    fn on_event(&self, run_id: Uuid, event: &RunEvent);
}

/// Logs run events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_event(&self, run_id: Uuid, event: &RunEvent) {
        match event {
            RunEvent::StageStarted { stage } => {
                tracing::debug!(%run_id, %stage, "Stage started");
            }
            RunEvent::StageCompleted { stage, items } => {
                tracing::info!(%run_id, %stage, items, "Stage completed");
            }
            RunEvent::StatusLookupFailed { product_id, error } => {
                tracing::warn!(
                    %run_id,
                    product_id = %product_id,
                    kind = error.kind(),
                    error = %error,
                    "Assignment status lookup failed, assuming not assigned"
                );
            }
            RunEvent::SuggestionApplied {
                product_id,
                collection_id,
                confidence,
            } => {
                tracing::info!(
                    %run_id,
                    product_id = %product_id,
                    collection_id = %collection_id,
                    confidence,
                    "Suggestion applied"
                );
            }
            RunEvent::SuggestionSkipped {
                product_id,
                collection_id,
                reason,
            } => match reason {
                SkipReason::AssignFailed(error) => tracing::warn!(
                    %run_id,
                    product_id = %product_id,
                    collection_id = %collection_id,
                    kind = error.kind(),
                    error = %error,
                    "Assignment failed, suggestion skipped"
                ),
                _ => tracing::debug!(
                    %run_id,
                    product_id = %product_id,
                    collection_id = %collection_id,
                    reason = reason.as_str(),
                    "Suggestion skipped"
                ),
            },
        }
    }
}

#[cfg(any(test, feature = "mock"))]
/// Collects every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: parking_lot::Mutex<Vec<RunEvent>>,
}

#[cfg(any(test, feature = "mock"))]
impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().clone()
    }

    /// Stages in the order they completed.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RunEvent::StageCompleted { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }
}

#[cfg(any(test, feature = "mock"))]
impl RunObserver for RecordingObserver {
    fn on_event(&self, _run_id: Uuid, event: &RunEvent) {
        self.events.lock().push(event.clone());
    }
}
