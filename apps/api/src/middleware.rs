use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Extension, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};
use visaflow_application::{AuthFailure, RouteDecision};
use visaflow_domain::{RateLimitDecision, RateLimitPolicy, RoleRequirement, rate_limit_key};

use crate::dto::{ErrorResponse, RateLimitExceededResponse};
use crate::error::ApiResult;
use crate::request_context::{CLIENT_TOKEN_COOKIE, STAFF_TOKEN_COOKIE, request_token};
use crate::state::AppState;

const X_RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Counts the request against the route group's policy before anything else runs.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(policy): Extension<RateLimitPolicy>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let identity = state.client_identity.resolve(request.headers(), peer);
    let path = request.uri().path().to_owned();

    let decision = state
        .rate_limit_service
        .check_limit(&identity, &path, &policy)
        .await?;

    if !decision.allowed {
        let retry_after = decision.retry_after_seconds(state.rate_limit_service.now_millis());
        info!(
            policy = policy.name(),
            key = %rate_limit_key(&identity, &path),
            retry_after,
            "rate limit exceeded"
        );
        return Ok(rate_limit_exceeded_response(decision.reset_time_ms, retry_after));
    }

    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &policy, &decision);
    Ok(response)
}

/// Builds the 429 response for a denied request.
pub fn rate_limit_exceeded_response(reset_time_ms: i64, retry_after_seconds: u64) -> Response {
    let payload = RateLimitExceededResponse {
        error: "RATE_LIMIT_EXCEEDED",
        message: format!(
            "Too many requests. Please try again in {retry_after_seconds} seconds."
        ),
        retry_after: retry_after_seconds,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(payload)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_seconds));
    headers.insert(X_RATE_LIMIT_RESET, HeaderValue::from(reset_time_ms));
    response
}

fn apply_rate_limit_headers(
    headers: &mut HeaderMap,
    policy: &RateLimitPolicy,
    decision: &RateLimitDecision,
) {
    headers.insert(X_RATE_LIMIT_LIMIT, HeaderValue::from(policy.max_requests()));
    headers.insert(X_RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATE_LIMIT_RESET, HeaderValue::from(decision.reset_time_ms));
}

/// Admits staff whose current role satisfies the route group's requirement.
pub async fn require_staff(
    State(state): State<AppState>,
    Extension(requirement): Extension<RoleRequirement>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request_token(request.headers(), STAFF_TOKEN_COOKIE);

    match state
        .auth_gate_service
        .authorize(token.as_deref(), &requirement)
        .await
    {
        RouteDecision::Allowed(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        RouteDecision::Denied(failure) => auth_failure_response(failure),
    }
}

/// Admits active clients holding a client token.
pub async fn require_client(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request_token(request.headers(), CLIENT_TOKEN_COOKIE);

    match state
        .auth_gate_service
        .authenticate_client(token.as_deref())
        .await
    {
        Ok(client) => {
            request.extensions_mut().insert(client);
            next.run(request).await
        }
        Err(failure) => auth_failure_response(failure),
    }
}

fn auth_failure_response(failure: AuthFailure) -> Response {
    debug!(code = failure.code(), "request rejected by auth gate");

    let status =
        StatusCode::from_u16(failure.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let payload = ErrorResponse {
        error: failure.code(),
        message: failure.message().to_owned(),
    };

    (status, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::rate_limit_exceeded_response;

    #[test]
    fn exceeded_response_carries_retry_headers() {
        let response = rate_limit_exceeded_response(1_700_000_900_000, 900);

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok()),
            Some("900")
        );
        assert_eq!(
            response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|value| value.to_str().ok()),
            Some("1700000900000")
        );
    }
}
