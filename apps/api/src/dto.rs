use serde::{Deserialize, Serialize};
use ts_rs::TS;
use visaflow_domain::{AuthenticatedClient, AuthenticatedUser};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Payload returned with HTTP 429.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rate-limit-exceeded-response.ts"
)]
pub struct RateLimitExceededResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "retryAfter")]
    #[ts(type = "number")]
    pub retry_after: u64,
}

/// Generic message response for auth flows.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generic-message-response.ts"
)]
pub struct GenericMessageResponse {
    pub message: String,
}

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub email: String,
    pub password: String,
}

/// API representation of an authenticated staff user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/staff-user-response.ts"
)]
pub struct StaffUserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&AuthenticatedUser> for StaffUserResponse {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_owned(),
            name: user.name().to_owned(),
            role: user.role().as_str().to_owned(),
        }
    }
}

/// API representation of an authenticated client.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/client-response.ts"
)]
pub struct ClientResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub status: String,
}

impl From<&AuthenticatedClient> for ClientResponse {
    fn from(client: &AuthenticatedClient) -> Self {
        Self {
            id: client.id().to_string(),
            email: client.email().to_owned(),
            name: client.name().to_owned(),
            status: client.status().as_str().to_owned(),
        }
    }
}

/// Staff login result. The token is also set as the `auth-token` cookie.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/staff-login-response.ts"
)]
pub struct StaffLoginResponse {
    pub token: String,
    #[ts(type = "number")]
    pub expires_at: i64,
    pub user: StaffUserResponse,
}

/// Client login result. The token is also set as the `client-token` cookie.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/client-login-response.ts"
)]
pub struct ClientLoginResponse {
    pub token: String,
    #[ts(type = "number")]
    pub expires_at: i64,
    pub client: ClientResponse,
}

/// Result of an explicit rate limit sweep.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rate-limit-sweep-response.ts"
)]
pub struct RateLimitSweepResponse {
    #[ts(type = "number")]
    pub removed: u64,
}

#[cfg(test)]
mod tests {
    use super::{
        AuthLoginRequest, ClientLoginResponse, ClientResponse, ErrorResponse,
        GenericMessageResponse, HealthResponse, RateLimitExceededResponse,
        RateLimitSweepResponse, StaffLoginResponse, StaffUserResponse,
    };

    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        RateLimitExceededResponse::export(&config)?;
        GenericMessageResponse::export(&config)?;
        AuthLoginRequest::export(&config)?;
        StaffUserResponse::export(&config)?;
        ClientResponse::export(&config)?;
        StaffLoginResponse::export(&config)?;
        ClientLoginResponse::export(&config)?;
        RateLimitSweepResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn rate_limit_payload_uses_camel_case_retry_after() {
        let payload = RateLimitExceededResponse {
            error: "RATE_LIMIT_EXCEEDED",
            message: "Too many requests. Please try again in 3 seconds.".to_owned(),
            retry_after: 3,
        };

        let value = serde_json::to_value(&payload).unwrap_or_default();
        assert_eq!(value["retryAfter"], 3);
        assert!(value.get("retry_after").is_none());
    }
}
