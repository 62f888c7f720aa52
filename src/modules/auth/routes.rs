use atrium_authz::Role;
use atrium_http::{AppError, AppResult, Json};
use axum::{extract::State, http::StatusCode, routing::post, Router};
use validator::Validate;

use super::AuthState;
use crate::modules::users::models::{Login, LoginResponse, Register};
use crate::modules::users::User;

/// Same message for unknown users and wrong passwords
pub const BAD_CREDENTIALS: &str = "invalid username or password";

pub fn router() -> Router<AuthState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<Register>,
) -> AppResult<(StatusCode, Json<User>)> {
    payload.validate()?;

    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::invalid_field("username", "must not be blank"));
    }

    let role = payload.role.unwrap_or(Role::User);
    let user = state
        .users
        .create(username, &payload.password, role)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<Login>,
) -> AppResult<Json<LoginResponse>> {
    let Some(user) = state
        .users
        .check_credentials(payload.username.trim(), &payload.password)
        .await?
    else {
        tracing::warn!(username = %payload.username, "login rejected");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    };

    let token = state
        .tokens
        .issue(&user.id, user.role)
        .map_err(AppError::internal)?;

    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse {
        token,
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}
