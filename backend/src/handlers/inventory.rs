//! Inventory ledger HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{BinLotStock, InventoryMovement, MovementFilter, Pagination, RecordMovementInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::InventoryService;
use crate::AppState;

pub async fn list_movements(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<MovementFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Vec<InventoryMovement>>> {
    let movements = InventoryService::new(state.db.clone())
        .list_movements(user.farm_id, &filter, &pagination)
        .await?;
    Ok(Json(movements))
}

pub async fn get_movement(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<InventoryMovement>> {
    let movement = InventoryService::new(state.db.clone())
        .get_movement(user.farm_id, movement_id)
        .await?;
    Ok(Json(movement))
}

/// Record a RECEIVE, TRANSFER or ADJUSTMENT movement
pub async fn record_movement(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<(StatusCode, Json<InventoryMovement>)> {
    let movement = InventoryService::new(state.db.clone())
        .record_movement(user.farm_id, user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Admin-only ledger cleanup
pub async fn delete_movement(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(movement_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    InventoryService::new(state.db.clone())
        .delete_movement(user.farm_id, movement_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Positive rows of the bin/lot stock view
pub async fn get_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<BinLotStock>>> {
    let stock = InventoryService::new(state.db.clone()).stock(user.farm_id).await?;
    Ok(Json(stock))
}
