use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::apply::{ApplyOutcome, AutoApplier};
use super::call::bounded;
use super::error::RunError;
use super::events::{RunEvent, RunObserver, Stage, TracingObserver};
use super::limiter::limit_per_product;
use super::ranker::SuggestionRanker;
use super::resolver::StatusResolver;
use super::types::{RunParams, RunResult, RunStats, Suggestion};
use crate::catalog::{AssignmentStore, CatalogResult, CatalogSource};
use crate::constants::DEFAULT_CALL_TIMEOUT_SECS;
use crate::scoring::TfIdfVectorizer;

/// Runs the fetch -> rank -> resolve -> limit -> apply pipeline against one catalog.
///
/// Each run vectorizes from scratch; nothing is carried over between runs.
pub struct AssignmentEngine<C> {
    catalog: C,
    ranker: SuggestionRanker,
    observer: Arc<dyn RunObserver>,
    call_timeout: Duration,
}

impl<C> AssignmentEngine<C>
where
    C: CatalogSource + AssignmentStore,
{
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            ranker: SuggestionRanker::default(),
            observer: Arc::new(TracingObserver),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Bounds every status lookup and assign call.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_vectorizer(mut self, vectorizer: TfIdfVectorizer) -> Self {
        self.ranker = SuggestionRanker::new(vectorizer);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub async fn run(&self, params: &RunParams) -> Result<RunResult, RunError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("suggest_run", %run_id, auto_apply = params.auto_apply);
        self.run_inner(run_id, params).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, params: &RunParams) -> Result<RunResult, RunError> {
        params.validate()?;

        self.stage_started(run_id, Stage::FetchCatalog);
        let products = self.catalog.fetch_products().await?;
        if products.is_empty() {
            return Err(RunError::NoProducts);
        }
        let collections = self.catalog.fetch_collections().await?;
        if collections.is_empty() {
            return Err(RunError::NoCollections);
        }
        let custom_collections = collections.iter().filter(|c| c.is_eligible()).count();
        if custom_collections == 0 {
            return Err(RunError::NoEligibleCollections);
        }
        self.stage_completed(run_id, Stage::FetchCatalog, products.len());

        info!(
            products = products.len(),
            collections = collections.len(),
            custom_collections,
            "Catalog loaded"
        );

        self.stage_started(run_id, Stage::Rank);
        let mut ranked =
            self.ranker
                .rank(&products, &collections, params.confidence_threshold)?;
        self.stage_completed(run_id, Stage::Rank, ranked.len());

        self.stage_started(run_id, Stage::ResolveStatus);
        StatusResolver::new(&self.catalog, self.call_timeout, self.observer.as_ref(), run_id)
            .resolve(&mut ranked)
            .await;
        self.stage_completed(run_id, Stage::ResolveStatus, ranked.len());

        self.stage_started(run_id, Stage::Limit);
        let suggestions = limit_per_product(ranked, params.max_suggestions_per_product);
        self.stage_completed(run_id, Stage::Limit, suggestions.len());

        let applied = if params.auto_apply {
            self.stage_started(run_id, Stage::AutoApply);
            let outcomes =
                AutoApplier::new(&self.catalog, self.call_timeout, self.observer.as_ref(), run_id)
                    .apply_all(&suggestions)
                    .await;
            let applied: Vec<Suggestion> = suggestions
                .iter()
                .zip(&outcomes)
                .filter(|(_, outcome)| matches!(outcome, ApplyOutcome::Applied))
                .map(|(s, _)| s.clone())
                .collect();
            self.stage_completed(run_id, Stage::AutoApply, applied.len());
            applied
        } else {
            Vec::new()
        };

        let already_assigned_count = suggestions.iter().filter(|s| s.already_assigned).count();
        let stats = RunStats {
            total_products: products.len(),
            total_collections: collections.len(),
            custom_collections,
            total_suggestions: suggestions.len(),
            total_applied: applied.len(),
            new_assignments: suggestions.len() - already_assigned_count,
            already_assigned_count,
        };

        info!(
            suggestions = stats.total_suggestions,
            applied = stats.total_applied,
            already_assigned = stats.already_assigned_count,
            "Run finished"
        );

        Ok(RunResult {
            run_id,
            suggestions,
            applied,
            stats,
        })
    }

    /// Commits one reviewed suggestion, bypassing the auto-apply confidence bar.
    pub async fn apply_one(&self, product_id: &str, collection_id: &str) -> CatalogResult<()> {
        bounded(
            "assign",
            self.call_timeout,
            self.catalog.assign(product_id, collection_id),
        )
        .await
    }

    fn stage_started(&self, run_id: Uuid, stage: Stage) {
        self.observer
            .on_event(run_id, &RunEvent::StageStarted { stage });
    }

    fn stage_completed(&self, run_id: Uuid, stage: Stage, items: usize) {
        self.observer
            .on_event(run_id, &RunEvent::StageCompleted { stage, items });
    }
}
