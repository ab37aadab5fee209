//! Access token transport: bearer header and auth cookies.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use visaflow_core::AppError;

/// Cookie carrying a staff token.
pub const STAFF_TOKEN_COOKIE: &str = "auth-token";

/// Cookie carrying a client token.
pub const CLIENT_TOKEN_COOKIE: &str = "client-token";

/// Returns the bearer token, or else the named cookie.
pub fn request_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_value(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
        })
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

/// Attributes shared by every auth cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthCookieSettings {
    pub secure: bool,
}

impl AuthCookieSettings {
    /// Builds a `Set-Cookie` value carrying a token.
    pub fn token_cookie(
        &self,
        cookie_name: &str,
        token: &str,
        max_age_seconds: i64,
    ) -> Result<HeaderValue, AppError> {
        self.cookie(cookie_name, token, max_age_seconds)
    }

    /// Builds a `Set-Cookie` value that removes the cookie.
    pub fn cleared_cookie(&self, cookie_name: &str) -> Result<HeaderValue, AppError> {
        self.cookie(cookie_name, "", 0)
    }

    fn cookie(
        &self,
        cookie_name: &str,
        value: &str,
        max_age_seconds: i64,
    ) -> Result<HeaderValue, AppError> {
        let secure = if self.secure { "; Secure" } else { "" };
        let cookie = format!(
            "{cookie_name}={value}; Max-Age={max_age_seconds}; Path=/; HttpOnly; SameSite=Lax{secure}"
        );

        HeaderValue::from_str(&cookie)
            .map_err(|error| AppError::Internal(format!("invalid auth cookie value: {error}")))
    }
}
