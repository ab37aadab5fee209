//! Signed access token payloads.

use serde::{Deserialize, Serialize};

/// Discriminator carried by every access token.
///
/// A staff token never authorizes a client operation and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Token issued to a back-office staff user.
    Staff,
    /// Token issued to an end customer.
    Client,
}

impl TokenKind {
    /// Returns the wire value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Client => "client",
        }
    }
}

/// Claims embedded in an access token.
///
/// Claims only say who the token was issued to. Role and active status are
/// always re-read from the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier (staff user id or client id).
    pub sub: String,
    /// Email at issuance time.
    pub email: String,
    /// Token kind discriminator.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}
