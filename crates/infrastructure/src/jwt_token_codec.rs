//! HS256 access token codec built on `jsonwebtoken`.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use visaflow_application::{IssuedToken, TokenCodec, TokenRejection};
use visaflow_core::{AppError, AppResult, Clock};
use visaflow_domain::{TokenClaims, TokenKind};

/// Token lifetimes per token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    /// Staff token lifetime in seconds.
    pub staff_seconds: i64,
    /// Client token lifetime in seconds.
    pub client_seconds: i64,
}

impl TokenLifetimes {
    /// Builds lifetimes from hour counts.
    #[must_use]
    pub fn from_hours(staff_hours: i64, client_hours: i64) -> Self {
        Self {
            staff_seconds: staff_hours.saturating_mul(3_600),
            client_seconds: client_hours.saturating_mul(3_600),
        }
    }

    fn for_kind(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Staff => self.staff_seconds,
            TokenKind::Client => self.client_seconds,
        }
    }
}

/// JWT implementation of the token codec port.
///
/// Without a secret every operation fails closed. Expiry is checked against
/// the injected clock with no leeway.
#[derive(Clone)]
pub struct JwtTokenCodec {
    secret: Option<Arc<str>>,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// Creates a codec with an optional signing secret.
    #[must_use]
    pub fn new(secret: Option<String>, lifetimes: TokenLifetimes, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret
                .filter(|value| !value.trim().is_empty())
                .map(Arc::from),
            lifetimes,
            clock,
        }
    }

    /// Returns whether a signing secret is configured.
    #[must_use]
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    fn now_seconds(&self) -> i64 {
        self.clock.now_millis().div_euclid(1_000)
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, subject: &str, email: &str, kind: TokenKind) -> AppResult<IssuedToken> {
        let Some(secret) = self.secret.as_deref() else {
            return Err(AppError::Configuration(
                "JWT_SECRET is not configured".to_owned(),
            ));
        };

        let issued_at = self.now_seconds();
        let max_age_seconds = self.lifetimes.for_kind(kind);
        let claims = TokenClaims {
            sub: subject.to_owned(),
            email: email.to_owned(),
            kind,
            iat: issued_at,
            exp: issued_at.saturating_add(max_age_seconds),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|error| AppError::Internal(format!("failed to sign access token: {error}")))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
            max_age_seconds,
        })
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        let Some(secret) = self.secret.as_deref() else {
            return Err(TokenRejection::MissingSecret);
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|error| match error.kind() {
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            _ => TokenRejection::Invalid(error.to_string()),
        })?;

        if claims.exp <= self.now_seconds() {
            return Err(TokenRejection::Expired);
        }

        Ok(claims)
    }
}
