use std::str::FromStr;
use std::sync::Arc;

use tracing::{error, warn};
use visaflow_domain::{
    AuthenticatedClient, AuthenticatedUser, ClientId, RoleRequirement, TokenClaims, TokenKind,
    UserId,
};

use crate::{IdentityRepository, TokenCodec};

use super::failure::{AuthFailure, RouteDecision};

/// Application service deciding who a caller is and what they may reach.
#[derive(Clone)]
pub struct AuthGateService {
    tokens: Arc<dyn TokenCodec>,
    identities: Arc<dyn IdentityRepository>,
}

impl AuthGateService {
    /// Creates a new auth gate service.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenCodec>, identities: Arc<dyn IdentityRepository>) -> Self {
        Self { tokens, identities }
    }

    /// Resolves a staff token to the current, active staff user.
    pub async fn authenticate_user(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthFailure> {
        let claims = self.decode_claims(token, TokenKind::Staff)?;
        let user_id = UserId::from_str(&claims.sub).map_err(|_| AuthFailure::InvalidToken)?;

        let user = self
            .identities
            .find_staff_user(user_id)
            .await
            .map_err(|lookup_error| {
                warn!(%user_id, error = %lookup_error, "staff identity lookup failed");
                AuthFailure::InvalidToken
            })?;

        user.and_then(AuthenticatedUser::from_active)
            .ok_or(AuthFailure::IdentityInactive)
    }

    /// Resolves a client token to the current, active client.
    pub async fn authenticate_client(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedClient, AuthFailure> {
        let claims = self.decode_claims(token, TokenKind::Client)?;
        let client_id = ClientId::from_str(&claims.sub).map_err(|_| AuthFailure::InvalidToken)?;

        let client = self
            .identities
            .find_client(client_id)
            .await
            .map_err(|lookup_error| {
                warn!(%client_id, error = %lookup_error, "client identity lookup failed");
                AuthFailure::InvalidToken
            })?;

        client
            .and_then(AuthenticatedClient::from_active)
            .ok_or(AuthFailure::IdentityInactive)
    }

    /// Returns the authenticated staff user, or `None` on any failure.
    pub async fn verify_auth(&self, token: Option<&str>) -> Option<AuthenticatedUser> {
        self.authenticate_user(token).await.ok()
    }

    /// Returns the authenticated client, or `None` on any failure.
    pub async fn verify_client_auth(&self, token: Option<&str>) -> Option<AuthenticatedClient> {
        self.authenticate_client(token).await.ok()
    }

    /// Authenticates a staff token and checks it against a route's role policy.
    pub async fn authorize(
        &self,
        token: Option<&str>,
        requirement: &RoleRequirement,
    ) -> RouteDecision {
        match self.authenticate_user(token).await {
            Ok(user) if requirement.is_satisfied_by(&user) => RouteDecision::Allowed(user),
            Ok(_) => RouteDecision::Denied(AuthFailure::Forbidden),
            Err(failure) => RouteDecision::Denied(failure),
        }
    }

    fn decode_claims(
        &self,
        token: Option<&str>,
        expected: TokenKind,
    ) -> Result<TokenClaims, AuthFailure> {
        let token = token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthFailure::Unauthenticated)?;

        let claims = self.tokens.decode(token).map_err(|rejection| {
            let failure = AuthFailure::from(rejection);
            if failure == AuthFailure::ConfigurationFault {
                error!("token signing secret is not configured; rejecting authenticated request");
            }
            failure
        })?;

        if claims.kind != expected {
            return Err(AuthFailure::InvalidToken);
        }

        Ok(claims)
    }
}
