use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use visaflow_core::AppError;

use crate::handlers;
use crate::state::AppState;

mod cors;
mod protected;
mod public_auth;


/// Builds the full router. Every rate-limited group counts a request before
/// its auth gate runs.
pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(build_routes(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?))
}

fn build_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(public_auth::build_login_routes(app_state.clone()))
        .merge(protected::build_api_routes(app_state.clone()))
        .with_state(app_state)
}
