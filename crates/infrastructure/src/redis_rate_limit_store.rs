//! Redis-backed rate limit store.

use async_trait::async_trait;
use redis::Script;

use visaflow_application::RateLimitStore;
use visaflow_core::{AppError, AppResult};
use visaflow_domain::{RateLimitDecision, RateLimitPolicy};

// Mirrors `visaflow_domain::admit`. The key lives one millisecond past its
// reset time so a request arriving exactly at the reset is still denied.
const RECORD_HIT_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local max_requests = tonumber(ARGV[3])

local count = tonumber(redis.call('HGET', key, 'count'))
local reset = tonumber(redis.call('HGET', key, 'reset'))

if count == nil or reset == nil or now > reset then
  reset = now + window
  redis.call('HSET', key, 'count', 1, 'reset', reset)
  redis.call('PEXPIREAT', key, reset + 1)
  return {1, max_requests - 1, reset}
end

if count >= max_requests then
  return {0, 0, reset}
end

count = redis.call('HINCRBY', key, 'count', 1)
return {1, max_requests - count, reset}
"#;

/// Redis implementation of the rate limit store port.
///
/// Counters are shared by every API instance pointing at the same Redis.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisRateLimitStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn record_hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> AppResult<RateLimitDecision> {
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let (allowed, remaining, reset_time_ms): (i64, i64, i64) = Script::new(RECORD_HIT_SCRIPT)
            .key(self.key_for(key))
            .arg(now_ms)
            .arg(policy.window_ms())
            .arg(policy.max_requests())
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to record redis rate limit hit: {error}"))
            })?;

        let remaining = u32::try_from(remaining).map_err(|error| {
            AppError::Internal(format!("invalid redis remaining count: {error}"))
        })?;

        Ok(RateLimitDecision {
            allowed: allowed == 1,
            remaining,
            reset_time_ms,
        })
    }

    async fn sweep_expired(&self, _now_ms: i64) -> AppResult<u64> {
        // Keys expire through PEXPIREAT.
        Ok(0)
    }
}
