//! Staff identities and role policy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use visaflow_core::AppError;

/// Unique identifier for a staff user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }
}

/// Back-office roles assigned to staff users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    /// Full administrative access.
    Admin,
    /// Administrative access for team leads.
    Manager,
    /// Regular back-office staff.
    Staff,
    /// Immigration consultant handling client cases.
    Consultant,
}

impl StaffRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Staff => "STAFF",
            Self::Consultant => "CONSULTANT",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[StaffRole] = &[
            StaffRole::Admin,
            StaffRole::Manager,
            StaffRole::Staff,
            StaffRole::Consultant,
        ];

        ALL
    }

    /// Returns whether this role grants administrative access.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl FromStr for StaffRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "STAFF" => Ok(Self::Staff),
            "CONSULTANT" => Ok(Self::Consultant),
            _ => Err(AppError::Validation(format!(
                "unknown staff role value '{value}'"
            ))),
        }
    }
}

/// Staff user as stored in the system of record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffUser {
    /// Stable identifier.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Current role.
    pub role: StaffRole,
    /// Deactivated users are never authenticated.
    pub is_active: bool,
}

/// Staff user whose token was verified and whose current record is active.
///
/// Only obtainable through [`AuthenticatedUser::from_active`], so holding one
/// proves the record was re-read and found active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    id: UserId,
    email: String,
    name: String,
    role: StaffRole,
}

impl AuthenticatedUser {
    /// Builds an authenticated identity from a freshly resolved record.
    ///
    /// Returns `None` for deactivated users.
    #[must_use]
    pub fn from_active(user: StaffUser) -> Option<Self> {
        if !user.is_active {
            return None;
        }

        Some(Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the user display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role resolved from the system of record.
    #[must_use]
    pub fn role(&self) -> StaffRole {
        self.role
    }
}

/// Returns whether the user holds an administrative role (ADMIN or MANAGER).
#[must_use]
pub fn is_admin(user: &AuthenticatedUser) -> bool {
    user.role.is_admin()
}

/// Returns whether the user's role is one of `roles`.
#[must_use]
pub fn has_role(user: &AuthenticatedUser, roles: &[StaffRole]) -> bool {
    roles.contains(&user.role)
}

/// Role policy declared by a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any active staff user.
    AnyStaff,
    /// Only users whose role is in the set.
    OneOf(Vec<StaffRole>),
}

impl RoleRequirement {
    /// Requirement for administrative routes.
    #[must_use]
    pub fn admin() -> Self {
        Self::OneOf(vec![StaffRole::Admin, StaffRole::Manager])
    }

    /// Returns whether the user satisfies this requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, user: &AuthenticatedUser) -> bool {
        match self {
            Self::AnyStaff => true,
            Self::OneOf(roles) => has_role(user, roles),
        }
    }
}
