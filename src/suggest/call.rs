use std::future::Future;
use std::time::{Duration, Instant};

use crate::catalog::{CatalogError, CatalogResult};

/// Awaits a collaborator call, failing with [`CatalogError::Timeout`] once `limit` elapses.
pub async fn bounded<T, F>(operation: &'static str, limit: Duration, fut: F) -> CatalogResult<T>
where
    F: Future<Output = CatalogResult<T>>,
{
    let started = Instant::now();
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CatalogError::Timeout {
            operation,
            elapsed: started.elapsed(),
        }),
    }
}
