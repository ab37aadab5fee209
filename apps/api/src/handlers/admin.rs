use axum::Json;
use axum::extract::{Extension, State};
use tracing::info;
use visaflow_domain::AuthenticatedUser;

use crate::dto::RateLimitSweepResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn sweep_rate_limits_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<RateLimitSweepResponse>> {
    let removed = state.rate_limit_service.sweep_expired().await?;
    info!(user_id = %user.id(), removed, "rate limit windows swept");

    Ok(Json(RateLimitSweepResponse { removed }))
}
