use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;
use tracing_subscriber::EnvFilter;
use visaflow_application::DEFAULT_SWEEP_PROBABILITY;
use visaflow_core::AppError;

use crate::client_identity::ClientIdentitySource;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitStoreConfig {
    Memory,
    Redis { redis_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub jwt_secret: Option<String>,
    pub staff_token_ttl_hours: i64,
    pub client_token_ttl_hours: i64,
    pub cookie_secure: bool,
    pub rate_limit_store: RateLimitStoreConfig,
    pub rate_limit_sweep_probability: f64,
    pub client_identity_source: ClientIdentitySource,
    pub trusted_proxies: Vec<IpNet>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::from_lookup(|name| env::var(name).ok())?;
        config.migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url =
            value("DATABASE_URL").ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let frontend_url =
            value("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = value("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", value("API_PORT"), 3001_u16)?;

        let jwt_secret = value("JWT_SECRET");
        if jwt_secret
            .as_ref()
            .is_some_and(|secret| secret.len() < MIN_JWT_SECRET_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }

        let staff_token_ttl_hours =
            positive_hours("STAFF_TOKEN_TTL_HOURS", value("STAFF_TOKEN_TTL_HOURS"), 24)?;
        let client_token_ttl_hours =
            positive_hours("CLIENT_TOKEN_TTL_HOURS", value("CLIENT_TOKEN_TTL_HOURS"), 168)?;
        let cookie_secure = value("AUTH_COOKIE_SECURE")
            .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));

        let rate_limit_store = match value("RATE_LIMIT_STORE")
            .unwrap_or_else(|| "memory".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => RateLimitStoreConfig::Memory,
            "redis" => RateLimitStoreConfig::Redis {
                redis_url: value("REDIS_URL").ok_or_else(|| {
                    AppError::Validation(
                        "REDIS_URL is required when RATE_LIMIT_STORE is 'redis'".to_owned(),
                    )
                })?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let rate_limit_sweep_probability = parse_or(
            "RATE_LIMIT_SWEEP_PROBABILITY",
            value("RATE_LIMIT_SWEEP_PROBABILITY"),
            DEFAULT_SWEEP_PROBABILITY,
        )?;

        let client_identity_source = value("CLIENT_IDENTITY_SOURCE")
            .map(|source| ClientIdentitySource::from_str(source.as_str()))
            .transpose()?
            .unwrap_or_default();

        let trusted_proxies = value("TRUSTED_PROXY_CIDRS")
            .map(|list| parse_cidrs(list.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            migrate_only: false,
            database_url,
            frontend_url,
            api_host,
            api_port,
            jwt_secret,
            staff_token_ttl_hours,
            client_token_ttl_hours,
            cookie_secure,
            rate_limit_store,
            rate_limit_sweep_probability,
            client_identity_source,
            trusted_proxies,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
    })
    .transpose()
    .map(|parsed| parsed.unwrap_or(default))
}

fn positive_hours(name: &str, raw: Option<String>, default: i64) -> Result<i64, AppError> {
    let hours = parse_or(name, raw, default)?;
    if hours <= 0 {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(hours)
}

fn parse_cidrs(list: &str) -> Result<Vec<IpNet>, AppError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            IpNet::from_str(entry).map_err(|error| {
                AppError::Validation(format!("invalid TRUSTED_PROXY_CIDRS entry '{entry}': {error}"))
            })
        })
        .collect()
}
