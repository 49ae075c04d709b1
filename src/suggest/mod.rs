//! Suggestion pipeline: rank, resolve assignment status, cap per product, optionally apply.
//!
//! [`AssignmentEngine`] drives a run against any [`CatalogSource`](crate::catalog::CatalogSource)
//! + [`AssignmentStore`](crate::catalog::AssignmentStore). Stages are exposed individually so
//! they can be tested in isolation.

pub mod apply;
pub mod call;
pub mod engine;
pub mod error;
pub mod events;
pub mod limiter;
pub mod ranker;
pub mod resolver;
pub mod types;


pub use apply::{ApplyOutcome, AutoApplier, AutoApplyPolicy, SkipReason};
pub use call::bounded;
pub use engine::AssignmentEngine;
pub use error::RunError;
#[cfg(any(test, feature = "mock"))]
pub use events::RecordingObserver;
pub use events::{RunEvent, RunObserver, Stage, TracingObserver};
pub use limiter::limit_per_product;
pub use ranker::{SuggestionRanker, rank_matrix};
pub use resolver::StatusResolver;
pub use types::{RunParams, RunResult, RunStats, Suggestion};
