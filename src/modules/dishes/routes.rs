use atrium_http::{Admin, AppResult, Authorized, Json};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};

use super::models::{Dish, DishPatch, NewDish};
use super::DishesState;
use crate::utils::{message, Message};

pub fn router() -> Router<DishesState> {
    Router::new()
        .route("/", get(list_dishes).post(create_dish))
        .route("/{id}", get(get_dish).put(update_dish).delete(delete_dish))
}

async fn list_dishes(State(state): State<DishesState>) -> AppResult<Json<Vec<Dish>>> {
    Ok(Json(state.dishes.list().await?))
}

async fn get_dish(
    State(state): State<DishesState>,
    Path(id): Path<String>,
) -> AppResult<Json<Dish>> {
    Ok(Json(state.dishes.get(&id).await?))
}

async fn create_dish(
    State(state): State<DishesState>,
    _admin: Authorized<Admin>,
    Json(payload): Json<NewDish>,
) -> AppResult<(StatusCode, Json<Dish>)> {
    let dish = state.dishes.create(payload).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

async fn update_dish(
    State(state): State<DishesState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
    Json(patch): Json<DishPatch>,
) -> AppResult<Json<Dish>> {
    Ok(Json(state.dishes.update(&id, patch).await?))
}

async fn delete_dish(
    State(state): State<DishesState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    state.dishes.delete(&id).await?;
    Ok(message("dish deleted"))
}
