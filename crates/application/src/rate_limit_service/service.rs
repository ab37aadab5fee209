use std::sync::Arc;

use tracing::warn;
use visaflow_core::{AppResult, Clock};
use visaflow_domain::{RateLimitDecision, RateLimitPolicy, rate_limit_key};

use super::config::RateLimitSettings;
use super::ports::RateLimitStore;

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    settings: RateLimitSettings,
}

impl RateLimitService {
    /// Creates a new rate limit service with default settings.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            settings: RateLimitSettings::default(),
        }
    }

    /// Replaces the service settings.
    #[must_use]
    pub fn with_settings(mut self, settings: RateLimitSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Checks whether `client_identity` may call `route_path` under `policy`.
    ///
    /// Every call is counted, including calls that end up denied by a later
    /// gate. A denied decision carries the unchanged reset time of the
    /// current window.
    pub async fn check_limit(
        &self,
        client_identity: &str,
        route_path: &str,
        policy: &RateLimitPolicy,
    ) -> AppResult<RateLimitDecision> {
        let now_ms = self.clock.now_millis();
        let key = rate_limit_key(client_identity, route_path);
        let decision = self.store.record_hit(&key, policy, now_ms).await?;

        if should_sweep(self.settings.sweep_probability()) {
            if let Err(error) = self.store.sweep_expired(now_ms).await {
                warn!(%error, "rate limit sweep failed");
            }
        }

        Ok(decision)
    }

    /// Removes every expired window now.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        self.store.sweep_expired(self.clock.now_millis()).await
    }

    /// Returns the current time of the service clock in milliseconds.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}

fn should_sweep(probability: f64) -> bool {
    if probability <= 0.0 {
        return false;
    }

    if probability >= 1.0 {
        return true;
    }

    let mut bytes = [0u8; 4];
    if getrandom::fill(&mut bytes).is_err() {
        return false;
    }

    f64::from(u32::from_le_bytes(bytes)) / f64::from(u32::MAX) < probability
}
