//! Process-local rate limit store backed by `DashMap`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use visaflow_application::RateLimitStore;
use visaflow_core::AppResult;
use visaflow_domain::{RateLimitDecision, RateLimitEntry, RateLimitPolicy, admit};

/// In-memory implementation of the rate limit store port.
///
/// Each key is updated while holding its shard lock, so concurrent requests
/// for one key never admit more than the policy allows.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no key is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn record_hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> AppResult<RateLimitDecision> {
        let decision = match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let (next, decision) = admit(Some(*occupied.get()), policy, now_ms);
                *occupied.get_mut() = next;
                decision
            }
            Entry::Vacant(vacant) => {
                let (next, decision) = admit(None, policy, now_ms);
                vacant.insert(next);
                decision
            }
        };

        Ok(decision)
    }

    async fn sweep_expired(&self, now_ms: i64) -> AppResult<u64> {
        let mut removed = 0_u64;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now_ms);
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}
