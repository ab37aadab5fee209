//! Ports used to verify tokens and resolve identities.

use async_trait::async_trait;
use visaflow_core::AppResult;
use visaflow_domain::{Client, ClientId, EmailAddress, StaffUser, TokenClaims, TokenKind, UserId};

/// Read-only access to the identity system of record.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Returns the current state of a staff user.
    async fn find_staff_user(&self, user_id: UserId) -> AppResult<Option<StaffUser>>;

    /// Returns the current state of a client.
    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>>;
}

/// Staff user with the stored password hash.
#[derive(Debug, Clone)]
pub struct StaffCredentials {
    /// Current staff record.
    pub user: StaffUser,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Client with the stored password hash.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// Current client record.
    pub client: Client,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Credential lookup by login email.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Finds a staff user and password hash by email.
    async fn find_staff_credentials(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<StaffCredentials>>;

    /// Finds a client and password hash by email.
    async fn find_client_credentials(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<ClientCredentials>>;
}

/// Port for password hashing and verification.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Reasons a token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    /// The server holds no signing secret.
    MissingSecret,
    /// The token expired.
    Expired,
    /// Bad signature, malformed payload or unsupported algorithm.
    Invalid(String),
}

/// Signed token handed to a caller after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Expiry, seconds since the Unix epoch.
    pub expires_at: i64,
    /// Lifetime in seconds.
    pub max_age_seconds: i64,
}

/// Port for signing and verifying access tokens.
///
/// `decode` only proves the token was issued by this server. Callers must
/// still resolve the subject through [`IdentityRepository`] before trusting
/// anything about it.
pub trait TokenCodec: Send + Sync {
    /// Signs a token for `subject`.
    fn issue(&self, subject: &str, email: &str, kind: TokenKind) -> AppResult<IssuedToken>;

    /// Verifies signature and expiry and returns the embedded claims.
    fn decode(&self, token: &str) -> Result<TokenClaims, TokenRejection>;
}
