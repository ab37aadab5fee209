//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod client;
mod email;
mod rate_limit;
mod staff;
mod token;

pub use client::{AuthenticatedClient, Client, ClientId, ClientStatus};
pub use email::EmailAddress;
pub use rate_limit::{
    RateLimitDecision, RateLimitEntry, RateLimitPolicy, admit, rate_limit_key, retry_after_seconds,
};
pub use staff::{
    AuthenticatedUser, RoleRequirement, StaffRole, StaffUser, UserId, has_role, is_admin,
};
pub use token::{TokenClaims, TokenKind};
