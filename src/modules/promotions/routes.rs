use atrium_http::{Admin, AppResult, Authorized, Json};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};

use super::models::{NewPromotion, Promotion, PromotionPatch};
use super::PromotionsState;
use crate::utils::{message, Message};

pub fn router() -> Router<PromotionsState> {
    Router::new()
        .route("/", get(list_promotions).post(create_promotion))
        .route(
            "/{id}",
            get(get_promotion)
                .put(update_promotion)
                .delete(delete_promotion),
        )
}

async fn list_promotions(
    State(state): State<PromotionsState>,
    _admin: Authorized<Admin>,
) -> AppResult<Json<Vec<Promotion>>> {
    Ok(Json(state.promotions.list().await?))
}

async fn get_promotion(
    State(state): State<PromotionsState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Promotion>> {
    Ok(Json(state.promotions.get(&id).await?))
}

async fn create_promotion(
    State(state): State<PromotionsState>,
    _admin: Authorized<Admin>,
    Json(payload): Json<NewPromotion>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    let promotion = state.promotions.create(payload).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

async fn update_promotion(
    State(state): State<PromotionsState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
    Json(patch): Json<PromotionPatch>,
) -> AppResult<Json<Promotion>> {
    Ok(Json(state.promotions.update(&id, patch).await?))
}

async fn delete_promotion(
    State(state): State<PromotionsState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    state.promotions.delete(&id).await?;
    Ok(message("promotion deleted"))
}
