use async_trait::async_trait;
use visaflow_core::AppResult;
use visaflow_domain::{RateLimitDecision, RateLimitPolicy};

/// Storage port for rate limit windows.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Applies one request to `key` and returns the admission decision.
    ///
    /// The read-modify-write of a single key must be atomic: concurrent calls
    /// for the same key may never admit more than `policy.max_requests()`
    /// requests per window.
    async fn record_hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> AppResult<RateLimitDecision>;

    /// Removes windows that expired before `now_ms`. Returns how many were removed.
    async fn sweep_expired(&self, now_ms: i64) -> AppResult<u64>;
}
