//! Buyer HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Buyer, CreateBuyerInput, UpdateBuyerInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::BuyerService;
use crate::AppState;

pub async fn list_buyers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Buyer>>> {
    let buyers = BuyerService::new(state.db.clone()).list_buyers(user.farm_id).await?;
    Ok(Json(buyers))
}

pub async fn get_buyer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(buyer_id): Path<Uuid>,
) -> AppResult<Json<Buyer>> {
    let buyer = BuyerService::new(state.db.clone()).get_buyer(user.farm_id, buyer_id).await?;
    Ok(Json(buyer))
}

pub async fn create_buyer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateBuyerInput>,
) -> AppResult<(StatusCode, Json<Buyer>)> {
    let buyer = BuyerService::new(state.db.clone()).create_buyer(user.farm_id, input).await?;
    Ok((StatusCode::CREATED, Json(buyer)))
}

pub async fn update_buyer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(buyer_id): Path<Uuid>,
    Json(input): Json<UpdateBuyerInput>,
) -> AppResult<Json<Buyer>> {
    let buyer = BuyerService::new(state.db.clone())
        .update_buyer(user.farm_id, buyer_id, input)
        .await?;
    Ok(Json(buyer))
}

pub async fn delete_buyer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(buyer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    BuyerService::new(state.db.clone()).delete_buyer(user.farm_id, buyer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
