use std::sync::Arc;

use visaflow_application::{AuthGateService, LoginService, RateLimitService};

use crate::client_identity::ClientIdentityResolver;
use crate::request_context::AuthCookieSettings;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_gate_service: AuthGateService,
    pub login_service: LoginService,
    pub rate_limit_service: RateLimitService,
    pub client_identity: Arc<ClientIdentityResolver>,
    pub auth_cookies: AuthCookieSettings,
}
