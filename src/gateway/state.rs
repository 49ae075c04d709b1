use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogConnector;
use crate::constants::DEFAULT_CALL_TIMEOUT_SECS;

pub struct HandlerState<K: CatalogConnector> {
    /// Produces one catalog client per request.
    pub connector: Arc<K>,

    /// Bound applied to each status lookup and assign call.
    pub call_timeout: Duration,
}

// Derived Clone would require `K: Clone`.
impl<K: CatalogConnector> Clone for HandlerState<K> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            call_timeout: self.call_timeout,
        }
    }
}

impl<K: CatalogConnector> HandlerState<K> {
    pub fn new(connector: K) -> Self {
        Self {
            connector: Arc::new(connector),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}
