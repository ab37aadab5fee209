use axum::Json;
use axum::extract::{Extension, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use tracing::info;
use visaflow_domain::{AuthenticatedClient, AuthenticatedUser};

use crate::dto::{
    AuthLoginRequest, ClientLoginResponse, ClientResponse, GenericMessageResponse,
    StaffLoginResponse, StaffUserResponse,
};
use crate::error::ApiResult;
use crate::request_context::{CLIENT_TOKEN_COOKIE, STAFF_TOKEN_COOKIE};
use crate::state::AppState;

pub async fn staff_login_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Response> {
    let login = state
        .login_service
        .login_staff(&payload.email, &payload.password)
        .await?;
    let cookie = state.auth_cookies.token_cookie(
        STAFF_TOKEN_COOKIE,
        &login.token.token,
        login.token.max_age_seconds,
    )?;

    info!(user_id = %login.user.id(), role = login.user.role().as_str(), "staff signed in");

    let body = StaffLoginResponse {
        user: StaffUserResponse::from(&login.user),
        token: login.token.token,
        expires_at: login.token.expires_at,
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn client_login_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Response> {
    let login = state
        .login_service
        .login_client(&payload.email, &payload.password)
        .await?;
    let cookie = state.auth_cookies.token_cookie(
        CLIENT_TOKEN_COOKIE,
        &login.token.token,
        login.token.max_age_seconds,
    )?;

    info!(client_id = %login.client.id(), "client signed in");

    let body = ClientLoginResponse {
        client: ClientResponse::from(&login.client),
        token: login.token.token,
        expires_at: login.token.expires_at,
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn staff_logout_handler(State(state): State<AppState>) -> ApiResult<Response> {
    logout_response(&state, STAFF_TOKEN_COOKIE)
}

pub async fn client_logout_handler(State(state): State<AppState>) -> ApiResult<Response> {
    logout_response(&state, CLIENT_TOKEN_COOKIE)
}

fn logout_response(state: &AppState, cookie_name: &str) -> ApiResult<Response> {
    let cookie = state.auth_cookies.cleared_cookie(cookie_name)?;
    let body = GenericMessageResponse {
        message: "signed out".to_owned(),
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn staff_me_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<StaffUserResponse> {
    Json(StaffUserResponse::from(&user))
}

pub async fn client_me_handler(
    Extension(client): Extension<AuthenticatedClient>,
) -> Json<ClientResponse> {
    Json(ClientResponse::from(&client))
}
