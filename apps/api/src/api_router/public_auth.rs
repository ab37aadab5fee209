use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use visaflow_domain::RateLimitPolicy;

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_login_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(handlers::auth::staff_login_handler))
        .route(
            "/api/client/auth/login",
            post(handlers::auth::client_login_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::rate_limit))
        .layer(axum::Extension(RateLimitPolicy::AUTH))
}
