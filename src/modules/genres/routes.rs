use atrium_http::{Admin, AppResult, Authorized, Json};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};

use super::models::{Genre, GenrePatch, NewGenre};
use super::GenresState;
use crate::utils::{message, Message};

pub fn router() -> Router<GenresState> {
    Router::new()
        .route("/", get(list_genres).post(create_genre))
        .route(
            "/{id}",
            get(get_genre).put(update_genre).delete(delete_genre),
        )
}

async fn list_genres(State(state): State<GenresState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.genres.list().await?))
}

async fn get_genre(
    State(state): State<GenresState>,
    Path(id): Path<String>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.genres.get(&id).await?))
}

async fn create_genre(
    State(state): State<GenresState>,
    _admin: Authorized<Admin>,
    Json(payload): Json<NewGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let genre = state.genres.create(payload).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn update_genre(
    State(state): State<GenresState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
    Json(patch): Json<GenrePatch>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.genres.update(&id, patch).await?))
}

async fn delete_genre(
    State(state): State<GenresState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    state.genres.delete(&id).await?;
    Ok(message("genre deleted"))
}
