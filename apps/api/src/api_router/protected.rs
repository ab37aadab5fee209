use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use visaflow_domain::{RateLimitPolicy, RoleRequirement};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_api_routes(app_state: AppState) -> Router<AppState> {
    let logout_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::staff_logout_handler))
        .route(
            "/api/client/auth/logout",
            post(handlers::auth::client_logout_handler),
        );

    let staff_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::staff_me_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_staff,
        ))
        .layer(axum::Extension(RoleRequirement::AnyStaff));

    let admin_routes = Router::new()
        .route(
            "/api/admin/rate-limits/sweep",
            post(handlers::admin::sweep_rate_limits_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_staff,
        ))
        .layer(axum::Extension(RoleRequirement::admin()));

    let client_routes = Router::new()
        .route("/api/client/me", get(handlers::auth::client_me_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_client,
        ));

    Router::new()
        .merge(logout_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .merge(client_routes)
        .route_layer(from_fn_with_state(app_state, middleware::rate_limit))
        .layer(axum::Extension(RateLimitPolicy::API))
}
