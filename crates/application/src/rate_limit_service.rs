//! Rate limiting ports and application service.
//!
//! Implements a fixed-window limiter keyed by caller identity and route path.
//! The store applies [`visaflow_domain::admit`] atomically per key; this service
//! builds keys, reads the clock and opportunistically sweeps expired windows.

mod config;
mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_SWEEP_PROBABILITY, RateLimitSettings};
pub use ports::RateLimitStore;
pub use service::RateLimitService;
