use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use visaflow_core::{AppError, AppResult, Clock, ManualClock};
use visaflow_domain::{RateLimitDecision, RateLimitEntry, RateLimitPolicy, admit};

use super::{RateLimitService, RateLimitSettings, RateLimitStore};

#[derive(Default)]
struct FakeRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    sweeps: AtomicUsize,
}

impl FakeRateLimitStore {
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl RateLimitStore for FakeRateLimitStore {
    async fn record_hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> AppResult<RateLimitDecision> {
        let mut entries = self.entries.lock().await;
        let (entry, decision) = admit(entries.get(key).copied(), policy, now_ms);
        entries.insert(key.to_owned(), entry);
        Ok(decision)
    }

    async fn sweep_expired(&self, now_ms: i64) -> AppResult<u64> {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now_ms));
        Ok((before - entries.len()) as u64)
    }
}

struct FailingRateLimitStore;

#[async_trait]
impl RateLimitStore for FailingRateLimitStore {
    async fn record_hit(
        &self,
        _key: &str,
        _policy: &RateLimitPolicy,
        _now_ms: i64,
    ) -> AppResult<RateLimitDecision> {
        Err(AppError::Internal("store unavailable".to_owned()))
    }

    async fn sweep_expired(&self, _now_ms: i64) -> AppResult<u64> {
        Ok(0)
    }
}

const START_MS: i64 = 1_700_000_000_000;

fn service_with(
    store: Arc<FakeRateLimitStore>,
    clock: Arc<ManualClock>,
    sweep_probability: f64,
) -> RateLimitService {
    let settings = RateLimitSettings::new(sweep_probability).unwrap_or_default();
    RateLimitService::new(store, clock).with_settings(settings)
}

async fn burst(
    service: &RateLimitService,
    identity: &str,
    path: &str,
    policy: &RateLimitPolicy,
    calls: usize,
) -> Vec<RateLimitDecision> {
    let mut decisions = Vec::with_capacity(calls);
    for _ in 0..calls {
        match service.check_limit(identity, path, policy).await {
            Ok(decision) => decisions.push(decision),
            Err(error) => panic!("rate limit check failed: {error}"),
        }
    }
    decisions
}

#[tokio::test]
async fn auth_policy_rejects_sixth_login_attempt() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store, clock.clone(), 0.0);

    let decisions = burst(
        &service,
        "1.2.3.4",
        "/api/auth/login",
        &RateLimitPolicy::AUTH,
        5,
    )
    .await;
    assert!(decisions.iter().all(|decision| decision.allowed));
    assert_eq!(
        decisions
            .iter()
            .map(|decision| decision.remaining)
            .collect::<Vec<_>>(),
        vec![4, 3, 2, 1, 0]
    );

    clock.advance_millis(60_000);
    let sixth = service
        .check_limit("1.2.3.4", "/api/auth/login", &RateLimitPolicy::AUTH)
        .await;
    let Ok(sixth) = sixth else {
        panic!("rate limit check failed");
    };

    assert!(!sixth.allowed);
    assert_eq!(sixth.remaining, 0);
    assert_eq!(sixth.reset_time_ms, START_MS + 15 * 60 * 1000);

    let retry_after = sixth.retry_after_seconds(clock.now_millis());
    assert!(retry_after > 0 && retry_after <= 900);
}

#[tokio::test]
async fn checkout_burst_yields_five_successes_then_five_rejections() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store, clock, 0.0);

    let decisions = burst(
        &service,
        "203.0.113.9",
        "/api/checkout",
        &RateLimitPolicy::CHECKOUT,
        10,
    )
    .await;
    let allowed: Vec<bool> = decisions.iter().map(|decision| decision.allowed).collect();

    assert_eq!(
        allowed,
        vec![true, true, true, true, true, false, false, false, false, false]
    );
}

#[tokio::test]
async fn window_reset_restores_full_budget_with_later_reset_time() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store, clock.clone(), 0.0);
    let policy = RateLimitPolicy::EMAIL;

    let first_window = burst(&service, "client", "/api/contact", &policy, 3).await;
    assert!(!first_window[2].allowed);

    clock.advance_millis(policy.window_ms() + 1);
    let next = burst(&service, "client", "/api/contact", &policy, 1).await;

    assert!(next[0].allowed);
    assert_eq!(next[0].remaining, policy.max_requests() - 1);
    assert!(next[0].reset_time_ms > first_window[0].reset_time_ms);
}

#[tokio::test]
async fn distinct_identities_and_routes_do_not_share_budgets() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store, clock, 0.0);
    let policy = RateLimitPolicy::EMAIL;

    let exhausted = burst(&service, "10.0.0.1", "/api/contact", &policy, 3).await;
    assert!(!exhausted[2].allowed);

    let other_identity = burst(&service, "10.0.0.2", "/api/contact", &policy, 1).await;
    let other_route = burst(&service, "10.0.0.1", "/api/newsletter", &policy, 1).await;

    assert!(other_identity[0].allowed);
    assert_eq!(other_identity[0].remaining, 1);
    assert!(other_route[0].allowed);
    assert_eq!(other_route[0].remaining, 1);
}

#[tokio::test]
async fn clock_going_backwards_keeps_current_window() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store, clock.clone(), 0.0);
    let policy = RateLimitPolicy::CHECKOUT;

    let first = burst(&service, "client", "/api/checkout", &policy, 1).await;
    clock.advance_millis(-30_000);
    let second = burst(&service, "client", "/api/checkout", &policy, 1).await;

    assert_eq!(second[0].reset_time_ms, first[0].reset_time_ms);
    assert_eq!(second[0].remaining, 3);
}

#[tokio::test]
async fn explicit_sweep_evicts_only_expired_windows() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store.clone(), clock.clone(), 0.0);

    burst(&service, "a", "/api/contact", &RateLimitPolicy::EMAIL, 1).await;
    burst(&service, "b", "/api/auth/login", &RateLimitPolicy::AUTH, 1).await;
    assert_eq!(store.len().await, 2);

    clock.advance_millis(RateLimitPolicy::EMAIL.window_ms() + 1);
    let removed = service.sweep_expired().await;

    assert_eq!(removed.ok(), Some(1));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn zero_probability_never_sweeps_and_one_always_sweeps() {
    let clock = Arc::new(ManualClock::new(START_MS));

    let never_store = Arc::new(FakeRateLimitStore::default());
    let never = service_with(never_store.clone(), clock.clone(), 0.0);
    burst(&never, "a", "/api/x", &RateLimitPolicy::API, 20).await;
    assert_eq!(never_store.sweeps.load(Ordering::SeqCst), 0);

    let always_store = Arc::new(FakeRateLimitStore::default());
    let always = service_with(always_store.clone(), clock, 1.0);
    burst(&always, "a", "/api/x", &RateLimitPolicy::API, 20).await;
    assert_eq!(always_store.sweeps.load(Ordering::SeqCst), 20);
}

#[tokio::test]
async fn repeated_checks_eventually_clean_up_expired_windows() {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service_with(store.clone(), clock.clone(), 0.25);

    for index in 0..50 {
        burst(
            &service,
            &format!("198.51.100.{index}"),
            "/api/contact",
            &RateLimitPolicy::EMAIL,
            1,
        )
        .await;
    }

    clock.advance_millis(RateLimitPolicy::EMAIL.window_ms() + 1);
    for _ in 0..400 {
        burst(&service, "steady", "/api/health", &RateLimitPolicy::API, 1).await;
        clock.advance_millis(1);
    }

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn store_failures_propagate() {
    let clock = Arc::new(ManualClock::new(START_MS));
    let service = RateLimitService::new(Arc::new(FailingRateLimitStore), clock);

    let result = service
        .check_limit("1.2.3.4", "/api/auth/login", &RateLimitPolicy::AUTH)
        .await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[test]
fn settings_reject_out_of_range_probability() {
    assert!(RateLimitSettings::new(-0.1).is_err());
    assert!(RateLimitSettings::new(1.5).is_err());
    assert!(RateLimitSettings::new(0.5).is_ok());
}
