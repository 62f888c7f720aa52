use atrium_http::{Admin, AppResult, Authorized, Json};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};

use super::models::{Leader, LeaderPatch, NewLeader};
use super::LeadersState;
use crate::utils::{message, Message};

/// Every leader route is restricted to administrators, reads included.
pub fn router() -> Router<LeadersState> {
    Router::new()
        .route("/", get(list_leaders).post(create_leader))
        .route(
            "/{id}",
            get(get_leader).put(update_leader).delete(delete_leader),
        )
}

async fn list_leaders(
    State(state): State<LeadersState>,
    _admin: Authorized<Admin>,
) -> AppResult<Json<Vec<Leader>>> {
    Ok(Json(state.leaders.list().await?))
}

async fn get_leader(
    State(state): State<LeadersState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Leader>> {
    Ok(Json(state.leaders.get(&id).await?))
}

async fn create_leader(
    State(state): State<LeadersState>,
    _admin: Authorized<Admin>,
    Json(payload): Json<NewLeader>,
) -> AppResult<(StatusCode, Json<Leader>)> {
    let leader = state.leaders.create(payload).await?;
    Ok((StatusCode::CREATED, Json(leader)))
}

async fn update_leader(
    State(state): State<LeadersState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
    Json(patch): Json<LeaderPatch>,
) -> AppResult<Json<Leader>> {
    Ok(Json(state.leaders.update(&id, patch).await?))
}

async fn delete_leader(
    State(state): State<LeadersState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    state.leaders.delete(&id).await?;
    Ok(message("leader deleted"))
}
