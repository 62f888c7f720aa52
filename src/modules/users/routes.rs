use atrium_http::{Admin, AppResult, Authorized, Json};
use axum::{extract::State, routing::get, Router};

use super::{User, UsersState};

pub fn router() -> Router<UsersState> {
    Router::new().route("/", get(list_users))
}

async fn list_users(
    State(state): State<UsersState>,
    Authorized(claims, _): Authorized<Admin>,
) -> AppResult<Json<Vec<User>>> {
    tracing::info!(admin = %claims.sub, "listing users");
    Ok(Json(state.users.list().await?))
}
