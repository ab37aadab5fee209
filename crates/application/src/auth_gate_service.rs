//! Token verification and role authorization.
//!
//! Each request walks the same path: find a token, verify it, re-read the
//! subject from the system of record, then check the route's role policy.
//! Role and active status always come from the re-read record, so a token
//! issued before a downgrade or deactivation loses its access immediately.

mod failure;
mod service;


pub use failure::{AuthFailure, RouteDecision};
pub use service::AuthGateService;
