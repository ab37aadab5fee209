use visaflow_core::AppError;
use visaflow_domain::AuthenticatedUser;

use crate::TokenRejection;

/// Terminal failure of the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No token in the authorization header or cookie.
    Unauthenticated,
    /// Token failed verification, expired, or has the wrong kind.
    InvalidToken,
    /// Subject no longer exists or is inactive.
    IdentityInactive,
    /// Subject lacks the role the route requires.
    Forbidden,
    /// The server cannot verify tokens at all.
    ConfigurationFault,
}

impl AuthFailure {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::IdentityInactive => "IDENTITY_INACTIVE",
            Self::Forbidden => "FORBIDDEN",
            Self::ConfigurationFault => "CONFIGURATION_FAULT",
        }
    }

    /// Returns the HTTP status code a route answers with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated | Self::InvalidToken | Self::IdentityInactive => 401,
            Self::Forbidden => 403,
            Self::ConfigurationFault => 500,
        }
    }

    /// Returns a caller-facing message.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "authentication required",
            Self::InvalidToken => "invalid or expired token",
            Self::IdentityInactive => "account is inactive or no longer exists",
            Self::Forbidden => "insufficient permissions",
            Self::ConfigurationFault => "authentication is not configured",
        }
    }
}

impl From<TokenRejection> for AuthFailure {
    fn from(value: TokenRejection) -> Self {
        match value {
            TokenRejection::MissingSecret => Self::ConfigurationFault,
            TokenRejection::Expired | TokenRejection::Invalid(_) => Self::InvalidToken,
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(value: AuthFailure) -> Self {
        let message = value.message().to_owned();
        match value {
            AuthFailure::Unauthenticated
            | AuthFailure::InvalidToken
            | AuthFailure::IdentityInactive => AppError::Unauthorized(message),
            AuthFailure::Forbidden => AppError::Forbidden(message),
            AuthFailure::ConfigurationFault => AppError::Configuration(message),
        }
    }
}

/// Outcome of a route protection check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The caller is authenticated and holds a permitted role.
    Allowed(AuthenticatedUser),
    /// The caller was turned away.
    Denied(AuthFailure),
}

impl RouteDecision {
    /// Returns 200 for allowed callers and the failure status otherwise.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Allowed(_) => 200,
            Self::Denied(failure) => failure.status_code(),
        }
    }

    /// Converts the decision into a result.
    pub fn into_result(self) -> Result<AuthenticatedUser, AuthFailure> {
        match self {
            Self::Allowed(user) => Ok(user),
            Self::Denied(failure) => Err(failure),
        }
    }
}
