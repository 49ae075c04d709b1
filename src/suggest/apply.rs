use std::time::Duration;

use uuid::Uuid;

use super::call::bounded;
use super::events::{RunEvent, RunObserver};
use super::types::Suggestion;
use crate::catalog::{AssignmentStore, CatalogError, CollectionKind};
use crate::constants::AUTO_APPLY_MIN_CONFIDENCE;

#[derive(Debug, Clone, PartialEq)]
/// Why a suggestion was not applied.
pub enum SkipReason {
    BelowConfidence,
    AlreadyAssigned,
    NotCustom,
    AssignFailed(CatalogError),
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::BelowConfidence => "below_confidence",
            SkipReason::AlreadyAssigned => "already_assigned",
            SkipReason::NotCustom => "not_custom",
            SkipReason::AssignFailed(_) => "assign_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied,
    Skipped(SkipReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

/// Decides whether a suggestion may be committed without review.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApplyPolicy;

impl AutoApplyPolicy {
    /// Strict lower bound; not configurable per run.
    pub const MIN_CONFIDENCE: f64 = AUTO_APPLY_MIN_CONFIDENCE;

    /// Checks the static rules, in order: confidence, existing link, collection kind.
    pub fn evaluate(&self, suggestion: &Suggestion) -> Result<(), SkipReason> {
        if suggestion.confidence <= Self::MIN_CONFIDENCE {
            return Err(SkipReason::BelowConfidence);
        }
        if suggestion.already_assigned {
            return Err(SkipReason::AlreadyAssigned);
        }
        if suggestion.collection_kind != CollectionKind::Custom {
            return Err(SkipReason::NotCustom);
        }
        Ok(())
    }

    pub fn is_eligible(&self, suggestion: &Suggestion) -> bool {
        self.evaluate(suggestion).is_ok()
    }
}

/// Runs the policy over a limited batch and commits the eligible suggestions.
pub struct AutoApplier<'a, S: ?Sized> {
    store: &'a S,
    policy: AutoApplyPolicy,
    call_timeout: Duration,
    observer: &'a dyn RunObserver,
    run_id: Uuid,
}

impl<'a, S> AutoApplier<'a, S>
where
    S: AssignmentStore + ?Sized,
{
    pub fn new(
        store: &'a S,
        call_timeout: Duration,
        observer: &'a dyn RunObserver,
        run_id: Uuid,
    ) -> Self {
        Self {
            store,
            policy: AutoApplyPolicy,
            call_timeout,
            observer,
            run_id,
        }
    }

    /// Returns one outcome per input suggestion, in input order.
    ///
    /// Assign calls are issued one at a time; a failure is recorded and the batch continues.
    pub async fn apply_all(&self, suggestions: &[Suggestion]) -> Vec<ApplyOutcome> {
        let mut outcomes = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            let outcome = self.apply(suggestion).await;
            self.report(suggestion, &outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn apply(&self, suggestion: &Suggestion) -> ApplyOutcome {
        if let Err(reason) = self.policy.evaluate(suggestion) {
            return ApplyOutcome::Skipped(reason);
        }

        let call = self
            .store
            .assign(&suggestion.product_id, &suggestion.collection_id);
        match bounded("assign", self.call_timeout, call).await {
            Ok(()) => ApplyOutcome::Applied,
            Err(error) => ApplyOutcome::Skipped(SkipReason::AssignFailed(error)),
        }
    }

    fn report(&self, suggestion: &Suggestion, outcome: &ApplyOutcome) {
        let event = match outcome {
            ApplyOutcome::Applied => RunEvent::SuggestionApplied {
                product_id: suggestion.product_id.clone(),
                collection_id: suggestion.collection_id.clone(),
                confidence: suggestion.confidence,
            },
            ApplyOutcome::Skipped(reason) => RunEvent::SuggestionSkipped {
                product_id: suggestion.product_id.clone(),
                collection_id: suggestion.collection_id.clone(),
                reason: reason.clone(),
            },
        };
        self.observer.on_event(self.run_id, &event);
    }
}
