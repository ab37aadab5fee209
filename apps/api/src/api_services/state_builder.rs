use std::sync::Arc;

use sqlx::PgPool;
use tracing::{error, info};
use visaflow_application::{
    AuthGateService, LoginService, RateLimitService, RateLimitSettings, RateLimitStore,
};
use visaflow_core::{AppError, Clock, SystemClock};
use visaflow_infrastructure::{
    Argon2PasswordHasher, InMemoryRateLimitStore, JwtTokenCodec, PostgresIdentityRepository,
    RedisRateLimitStore, TokenLifetimes,
};

use crate::api_config::{ApiConfig, RateLimitStoreConfig};
use crate::client_identity::ClientIdentityResolver;
use crate::request_context::AuthCookieSettings;
use crate::state::AppState;

use super::build_redis_client;

const REDIS_RATE_LIMIT_PREFIX: &str = "visaflow:rate_limit";

pub fn build_app_state(config: &ApiConfig, pool: PgPool) -> Result<AppState, AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if config.jwt_secret.is_none() {
        error!("JWT_SECRET is not set; authenticated routes will fail closed");
    }

    let token_codec = Arc::new(JwtTokenCodec::new(
        config.jwt_secret.clone(),
        TokenLifetimes::from_hours(config.staff_token_ttl_hours, config.client_token_ttl_hours),
        clock.clone(),
    ));
    let identity_repository = Arc::new(PostgresIdentityRepository::new(pool));

    let (rate_limit_store, store_kind): (Arc<dyn RateLimitStore>, &str) =
        match &config.rate_limit_store {
            RateLimitStoreConfig::Memory => (Arc::new(InMemoryRateLimitStore::new()), "memory"),
            RateLimitStoreConfig::Redis { redis_url } => (
                Arc::new(RedisRateLimitStore::new(
                    build_redis_client(redis_url)?,
                    REDIS_RATE_LIMIT_PREFIX,
                )),
                "redis",
            ),
        };
    let rate_limit_settings = RateLimitSettings::new(config.rate_limit_sweep_probability)?;
    info!(
        store = store_kind,
        sweep_probability = rate_limit_settings.sweep_probability(),
        "rate limiting configured"
    );

    Ok(AppState {
        auth_gate_service: AuthGateService::new(token_codec.clone(), identity_repository.clone()),
        login_service: LoginService::new(
            identity_repository,
            Arc::new(Argon2PasswordHasher::new()),
            token_codec,
        ),
        rate_limit_service: RateLimitService::new(rate_limit_store, clock)
            .with_settings(rate_limit_settings),
        client_identity: Arc::new(ClientIdentityResolver::new(
            config.client_identity_source,
            config.trusted_proxies.clone(),
        )),
        auth_cookies: AuthCookieSettings {
            secure: config.cookie_secure,
        },
    })
}
