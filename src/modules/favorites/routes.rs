use atrium_http::{AppResult, Authorized, Json, Member};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};

use super::models::{DishRef, FavoriteView};
use super::FavoritesState;
use crate::utils::{message, Message};

pub fn router() -> Router<FavoritesState> {
    Router::new()
        .route(
            "/",
            get(get_favorites).post(add_favorites).delete(clear_favorites),
        )
        .route("/{dish_id}", post(add_favorite).delete(remove_favorite))
}

async fn get_favorites(
    State(state): State<FavoritesState>,
    Authorized(claims, _): Authorized<Member>,
) -> AppResult<Json<FavoriteView>> {
    Ok(Json(state.favorites.get(&claims.sub).await?))
}

async fn add_favorites(
    State(state): State<FavoritesState>,
    Authorized(claims, _): Authorized<Member>,
    Json(refs): Json<Vec<DishRef>>,
) -> AppResult<Json<FavoriteView>> {
    Ok(Json(state.favorites.add_many(&claims.sub, &refs).await?))
}

async fn clear_favorites(
    State(state): State<FavoritesState>,
    Authorized(claims, _): Authorized<Member>,
) -> AppResult<Json<Message>> {
    state.favorites.remove_all(&claims.sub).await?;
    Ok(message("favorites deleted"))
}

async fn add_favorite(
    State(state): State<FavoritesState>,
    Authorized(claims, _): Authorized<Member>,
    Path(dish_id): Path<String>,
) -> AppResult<Json<FavoriteView>> {
    Ok(Json(state.favorites.add_one(&claims.sub, &dish_id).await?))
}

async fn remove_favorite(
    State(state): State<FavoritesState>,
    Authorized(claims, _): Authorized<Member>,
    Path(dish_id): Path<String>,
) -> AppResult<Json<FavoriteView>> {
    Ok(Json(state.favorites.remove_one(&claims.sub, &dish_id).await?))
}
