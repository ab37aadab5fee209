//! Fixed-window request admission.
//!
//! Every key owns a window that opens on its first request and lasts
//! `window_ms`. Requests inside the window are counted; once the count reaches
//! `max_requests` further requests are denied until the window expires, at
//! which point the next request opens a fresh window.
//!
//! Up to `2 * max_requests` requests can pass across the boundary of two
//! adjacent windows. That is a property of fixed windows and is kept as-is.

use visaflow_core::{AppError, AppResult};

/// Request budget applied to one route class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    name: &'static str,
    window_ms: i64,
    max_requests: u32,
}

impl RateLimitPolicy {
    /// Login and credential endpoints: 5 requests per 15 minutes.
    pub const AUTH: Self = Self {
        name: "auth",
        window_ms: 15 * 60 * 1000,
        max_requests: 5,
    };

    /// Generic API endpoints: 100 requests per minute.
    pub const API: Self = Self {
        name: "api",
        window_ms: 60 * 1000,
        max_requests: 100,
    };

    /// Eligibility analysis endpoints: 10 requests per minute.
    pub const ANALYSIS: Self = Self {
        name: "analysis",
        window_ms: 60 * 1000,
        max_requests: 10,
    };

    /// Outbound email endpoints: 2 requests per minute.
    pub const EMAIL: Self = Self {
        name: "email",
        window_ms: 60 * 1000,
        max_requests: 2,
    };

    /// Checkout and payment endpoints: 5 requests per minute.
    pub const CHECKOUT: Self = Self {
        name: "checkout",
        window_ms: 60 * 1000,
        max_requests: 5,
    };

    /// Creates a custom policy.
    pub fn new(name: &'static str, window_ms: i64, max_requests: u32) -> AppResult<Self> {
        if window_ms <= 0 {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero".to_owned(),
            ));
        }

        if max_requests == 0 {
            return Err(AppError::Validation(
                "rate limit max_requests must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            name,
            window_ms,
            max_requests,
        })
    }

    /// Returns all named policies.
    #[must_use]
    pub fn named() -> &'static [Self] {
        const NAMED: &[RateLimitPolicy] = &[
            RateLimitPolicy::AUTH,
            RateLimitPolicy::API,
            RateLimitPolicy::ANALYSIS,
            RateLimitPolicy::EMAIL,
            RateLimitPolicy::CHECKOUT,
        ];

        NAMED
    }

    /// Returns the policy name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the window duration in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Returns the number of requests admitted per window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

/// Counter state for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests observed in the current window.
    pub count: u32,
    /// Absolute window expiry in milliseconds since the Unix epoch.
    pub reset_time_ms: i64,
}

impl RateLimitEntry {
    /// Returns whether the window closed before `now_ms`.
    #[must_use]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.reset_time_ms
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Absolute window expiry in milliseconds since the Unix epoch.
    pub reset_time_ms: i64,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up and never below one.
    #[must_use]
    pub fn retry_after_seconds(&self, now_ms: i64) -> u64 {
        retry_after_seconds(self.reset_time_ms, now_ms)
    }
}

/// Whole seconds from `now_ms` until `reset_time_ms`, rounded up, minimum one.
#[must_use]
pub fn retry_after_seconds(reset_time_ms: i64, now_ms: i64) -> u64 {
    let remaining_ms = reset_time_ms.saturating_sub(now_ms).max(0);
    let seconds = remaining_ms.saturating_add(999) / 1000;
    u64::try_from(seconds).unwrap_or(0).max(1)
}

/// Builds the store key for a caller and route.
#[must_use]
pub fn rate_limit_key(client_identity: &str, route_path: &str) -> String {
    format!("{client_identity}-{route_path}")
}

/// Applies one request to the current entry of a key.
///
/// Returns the entry to persist and the decision for the caller. A denied
/// request leaves the entry untouched so the caller waits out the existing
/// window. An expired or missing entry is replaced, never merged.
#[must_use]
pub fn admit(
    current: Option<RateLimitEntry>,
    policy: &RateLimitPolicy,
    now_ms: i64,
) -> (RateLimitEntry, RateLimitDecision) {
    let entry = match current {
        Some(entry) if !entry.is_expired(now_ms) => entry,
        _ => {
            let fresh = RateLimitEntry {
                count: 1,
                reset_time_ms: now_ms.saturating_add(policy.window_ms),
            };
            return (
                fresh,
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.max_requests.saturating_sub(1),
                    reset_time_ms: fresh.reset_time_ms,
                },
            );
        }
    };

    if entry.count >= policy.max_requests {
        return (
            entry,
            RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_time_ms: entry.reset_time_ms,
            },
        );
    }

    let updated = RateLimitEntry {
        count: entry.count + 1,
        reset_time_ms: entry.reset_time_ms,
    };

    (
        updated,
        RateLimitDecision {
            allowed: true,
            remaining: policy.max_requests - updated.count,
            reset_time_ms: updated.reset_time_ms,
        },
    )
}
