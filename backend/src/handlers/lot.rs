//! Lot management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{
    saga::LotIntakeOutcome, CreateLotInput, InventoryMovement, Lot, LotDetail, LotFilter,
    LotIntakeInput, UpdateLotInput,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::LotService;
use crate::AppState;

/// List lots for the current farm
pub async fn list_lots(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<LotFilter>,
) -> AppResult<Json<Vec<Lot>>> {
    let lots = LotService::new(state.db.clone()).list_lots(user.farm_id, &filter).await?;
    Ok(Json(lots))
}

/// Get a lot with its stock, sales and movement history
pub async fn get_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<LotDetail>> {
    let lot = LotService::new(state.db.clone()).get_lot(user.farm_id, lot_id).await?;
    Ok(Json(lot))
}

/// Create a lot without receiving it into a bin
pub async fn create_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateLotInput>,
) -> AppResult<(StatusCode, Json<Lot>)> {
    let lot = LotService::new(state.db.clone()).create_lot(user.farm_id, input).await?;
    Ok((StatusCode::CREATED, Json(lot)))
}

/// Create a lot and receive its harvest into a bin
pub async fn lot_intake(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<LotIntakeInput>,
) -> AppResult<(StatusCode, Json<LotIntakeOutcome<Lot, InventoryMovement>>)> {
    let outcome = LotService::new(state.db.clone())
        .intake(user.farm_id, user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn update_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lot_id): Path<Uuid>,
    Json(input): Json<UpdateLotInput>,
) -> AppResult<Json<Lot>> {
    let lot = LotService::new(state.db.clone())
        .update_lot(user.farm_id, lot_id, input)
        .await?;
    Ok(Json(lot))
}

/// Delete a lot and its movements; blocked while the lot has sales
pub async fn delete_lot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lot_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    LotService::new(state.db.clone()).delete_lot(user.farm_id, lot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
