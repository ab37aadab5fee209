//! Password login and token issuance for staff and clients.

use std::sync::Arc;

use visaflow_core::{AppError, AppResult};
use visaflow_domain::{AuthenticatedClient, AuthenticatedUser, EmailAddress, TokenKind};

use crate::{CredentialRepository, IssuedToken, PasswordHasher, TokenCodec};


const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Staff user signed in with a fresh token.
#[derive(Debug, Clone)]
pub struct StaffLogin {
    /// Authenticated staff user.
    pub user: AuthenticatedUser,
    /// Signed staff token.
    pub token: IssuedToken,
}

/// Client signed in with a fresh token.
#[derive(Debug, Clone)]
pub struct ClientLogin {
    /// Authenticated client.
    pub client: AuthenticatedClient,
    /// Signed client token.
    pub token: IssuedToken,
}

/// Application service for password logins.
#[derive(Clone)]
pub struct LoginService {
    credentials: Arc<dyn CredentialRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl LoginService {
    /// Creates a new login service.
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            credentials,
            password_hasher,
            tokens,
        }
    }

    /// Verifies staff credentials and issues a staff token.
    ///
    /// Unknown emails, wrong passwords and deactivated accounts all produce
    /// the same error.
    pub async fn login_staff(&self, email: &str, password: &str) -> AppResult<StaffLogin> {
        let email = self.parse_login_email(email, password)?;
        let Some(credentials) = self.credentials.find_staff_credentials(&email).await? else {
            return Err(self.reject_unknown(password));
        };

        self.verify(password, &credentials.password_hash)?;

        let user = AuthenticatedUser::from_active(credentials.user).ok_or_else(invalid_credentials)?;
        let token = self
            .tokens
            .issue(&user.id().to_string(), user.email(), TokenKind::Staff)?;

        Ok(StaffLogin { user, token })
    }

    /// Verifies client credentials and issues a client token.
    pub async fn login_client(&self, email: &str, password: &str) -> AppResult<ClientLogin> {
        let email = self.parse_login_email(email, password)?;
        let Some(credentials) = self.credentials.find_client_credentials(&email).await? else {
            return Err(self.reject_unknown(password));
        };

        self.verify(password, &credentials.password_hash)?;

        let client =
            AuthenticatedClient::from_active(credentials.client).ok_or_else(invalid_credentials)?;
        let token = self
            .tokens
            .issue(&client.id().to_string(), client.email(), TokenKind::Client)?;

        Ok(ClientLogin { client, token })
    }

    fn verify(&self, password: &str, password_hash: &str) -> AppResult<()> {
        if password.is_empty() {
            return Err(self.reject_unknown(password));
        }

        if !self.password_hasher.verify_password(password, password_hash)? {
            return Err(invalid_credentials());
        }

        Ok(())
    }

    fn parse_login_email(&self, email: &str, password: &str) -> AppResult<EmailAddress> {
        EmailAddress::new(email).map_err(|_| self.reject_unknown(password))
    }

    /// Rejects a login that never reached a stored hash.
    ///
    /// Still pays for one Argon2 run so the response time does not reveal
    /// whether the email is registered.
    fn reject_unknown(&self, password: &str) -> AppError {
        let _ = self.password_hasher.hash_password(password);
        invalid_credentials()
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized(INVALID_CREDENTIALS.to_owned())
}
