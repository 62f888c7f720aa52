use atrium_authz::Claims;
use atrium_http::{Admin, AppError, AppResult, Authorized, Json, Member};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};

use super::{Comment, CommentPatch, CommentsState, NewComment};
use crate::utils::{message, Message};

/// Comment routes relative to the parent collection
pub fn router(state: CommentsState) -> Router {
    Router::new()
        .route(
            "/{id}/comments",
            get(list_comments).post(add_comment).delete(clear_comments),
        )
        .route(
            "/{id}/comments/{comment_id}",
            put(update_comment).delete(delete_comment),
        )
        .with_state(state)
}

/// Username of the caller; a token whose subject no longer exists is invalid
async fn author_of(state: &CommentsState, claims: &Claims) -> AppResult<String> {
    match state.users.get(&claims.sub).await? {
        Some(user) => Ok(user.username),
        None => {
            tracing::warn!(subject = %claims.sub, "token subject has no identity");
            Err(AppError::unauthorized("invalid token"))
        }
    }
}

async fn list_comments(
    State(state): State<CommentsState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.thread.list(&id).await?))
}

async fn add_comment(
    State(state): State<CommentsState>,
    Authorized(claims, _): Authorized<Member>,
    Path(id): Path<String>,
    Json(payload): Json<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let author = author_of(&state, &claims).await?;
    let comment = state.thread.add(&id, &author, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn update_comment(
    State(state): State<CommentsState>,
    Authorized(claims, _): Authorized<Member>,
    Path((id, comment_id)): Path<(String, String)>,
    Json(patch): Json<CommentPatch>,
) -> AppResult<Json<Comment>> {
    let actor = author_of(&state, &claims).await?;
    let comment = state.thread.update(&id, &comment_id, &actor, patch).await?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<CommentsState>,
    Authorized(claims, _): Authorized<Member>,
    Path((id, comment_id)): Path<(String, String)>,
) -> AppResult<Json<Message>> {
    let actor = author_of(&state, &claims).await?;
    state.thread.delete(&id, &comment_id, &actor).await?;
    Ok(message("comment deleted"))
}

async fn clear_comments(
    State(state): State<CommentsState>,
    Authorized(claims, _): Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    tracing::info!(admin = %claims.sub, parent_id = %id, "clearing comments");
    state.thread.clear(&id).await?;
    Ok(message("all comments deleted"))
}
