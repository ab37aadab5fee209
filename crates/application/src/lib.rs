//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_gate_service;
mod identity_ports;
mod login_service;
mod rate_limit_service;

pub use auth_gate_service::{AuthFailure, AuthGateService, RouteDecision};
pub use identity_ports::{
    ClientCredentials, CredentialRepository, IdentityRepository, IssuedToken, PasswordHasher,
    StaffCredentials, TokenCodec, TokenRejection,
};
pub use login_service::{ClientLogin, LoginService, StaffLogin};
pub use rate_limit_service::{
    DEFAULT_SWEEP_PROBABILITY, RateLimitService, RateLimitSettings, RateLimitStore,
};
