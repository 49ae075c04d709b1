use std::collections::{HashMap, HashSet};
use std::time::Duration;

use uuid::Uuid;

use super::call::bounded;
use super::events::{RunEvent, RunObserver};
use super::types::Suggestion;
use crate::catalog::AssignmentStore;

/// Marks suggestions whose product/collection link already exists remotely.
///
/// One lookup per product per run. A failed lookup is remembered as "unknown" and every
/// suggestion for that product is left unassigned.
pub struct StatusResolver<'a, S: ?Sized> {
    store: &'a S,
    call_timeout: Duration,
    observer: &'a dyn RunObserver,
    run_id: Uuid,
}

impl<'a, S> StatusResolver<'a, S>
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
            call_timeout,
            observer,
            run_id,
        }
    }

    pub async fn resolve(&self, suggestions: &mut [Suggestion]) {
        // None = lookup failed for that product.
        let mut known: HashMap<String, Option<HashSet<String>>> = HashMap::new();

        for suggestion in suggestions.iter_mut() {
            if !known.contains_key(&suggestion.product_id) {
                let assigned = self.lookup(&suggestion.product_id).await;
                known.insert(suggestion.product_id.clone(), assigned);
            }

            suggestion.already_assigned = known
                .get(&suggestion.product_id)
                .and_then(Option::as_ref)
                .is_some_and(|ids| ids.contains(&suggestion.collection_id));
        }
    }

    async fn lookup(&self, product_id: &str) -> Option<HashSet<String>> {
        let call = self.store.assigned_collections(product_id);
        match bounded("assigned_collections", self.call_timeout, call).await {
            Ok(ids) => Some(ids),
            Err(error) => {
                self.observer.on_event(
                    self.run_id,
                    &RunEvent::StatusLookupFailed {
                        product_id: product_id.to_string(),
                        error,
                    },
                );
                None
            }
        }
    }
}
