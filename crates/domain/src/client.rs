//! End-customer identities.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use visaflow_core::AppError;

/// Unique identifier for a client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Creates a new random client identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a client identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid client id '{value}': {error}")))
    }
}

/// Account status of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    /// Client may sign in.
    Active,
    /// Client closed or never activated the account.
    Inactive,
    /// Client access was revoked by staff.
    Suspended,
}

impl ClientStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl FromStr for ClientStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "SUSPENDED" => Ok(Self::Suspended),
            _ => Err(AppError::Validation(format!(
                "unknown client status value '{value}'"
            ))),
        }
    }
}

/// Client as stored in the system of record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Stable identifier.
    pub id: ClientId,
    /// Login email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Current account status.
    pub status: ClientStatus,
}

/// Client whose token was verified and whose current record is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedClient {
    id: ClientId,
    email: String,
    name: String,
    status: ClientStatus,
}

impl AuthenticatedClient {
    /// Builds an authenticated client from a freshly resolved record.
    ///
    /// Returns `None` unless the client is active.
    #[must_use]
    pub fn from_active(client: Client) -> Option<Self> {
        if client.status != ClientStatus::Active {
            return None;
        }

        Some(Self {
            id: client.id,
            email: client.email,
            name: client.name,
            status: client.status,
        })
    }

    /// Returns the client identifier.
    #[must_use]
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the client email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the client display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the status resolved from the system of record.
    #[must_use]
    pub fn status(&self) -> ClientStatus {
        self.status
    }
}
