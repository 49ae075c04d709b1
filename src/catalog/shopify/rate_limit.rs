//! Token-bucket limiter owned by a catalog client.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Async token bucket.
///
/// `acquire` reserves a token immediately (the balance may go negative) and sleeps for the
/// resulting debt, so concurrent callers queue up fairly without holding the lock while waiting.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Creates a full bucket. `refill_per_sec` must be positive and `burst` at least 1.
    pub fn new(refill_per_sec: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            capacity,
            refill_per_sec,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available and consumes it.
    pub async fn acquire(&self) {
        let wait = self.reserve(Instant::now());
        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis() as u64, "rate limiter delaying request");
            tokio::time::sleep(wait).await;
        }
    }

    /// Consumes one token as of `now` and returns how long the caller must wait for it.
    pub(crate) fn reserve(&self, now: Instant) -> Duration {
        let mut state = self.state.lock();

        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;

        state.tokens -= 1.0;
        if state.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-state.tokens / self.refill_per_sec)
        }
    }

    /// Tokens currently available (may be negative while callers are queued).
    pub fn available(&self) -> f64 {
        self.state.lock().tokens
    }
}
