//! Warehouse and bin HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{
    Bin, BinOverview, CreateBinInput, CreateWarehouseInput, UpdateBinInput, UpdateWarehouseInput,
    Warehouse, WarehouseWithBins,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::WarehouseService;
use crate::AppState;

pub async fn list_warehouses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<WarehouseWithBins>>> {
    let warehouses = WarehouseService::new(state.db.clone())
        .list_warehouses(user.farm_id)
        .await?;
    Ok(Json(warehouses))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseWithBins>> {
    let warehouse = WarehouseService::new(state.db.clone())
        .get_warehouse(user.farm_id, warehouse_id)
        .await?;
    Ok(Json(warehouse))
}

/// Create a warehouse together with its default bin
pub async fn create_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<WarehouseWithBins>)> {
    let warehouse = WarehouseService::new(state.db.clone())
        .create_warehouse(user.farm_id, input)
        .await?;
    state.master_data.invalidate(user.farm_id).await;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = WarehouseService::new(state.db.clone())
        .update_warehouse(user.farm_id, warehouse_id, input)
        .await?;
    state.master_data.invalidate(user.farm_id).await;
    Ok(Json(warehouse))
}

pub async fn delete_warehouse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    WarehouseService::new(state.db.clone())
        .delete_warehouse(user.farm_id, warehouse_id)
        .await?;
    state.master_data.invalidate(user.farm_id).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_bins(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<BinOverview>>> {
    let bins = WarehouseService::new(state.db.clone())
        .list_bins(user.farm_id, Some(warehouse_id))
        .await?;
    Ok(Json(bins))
}

#[derive(Debug, Deserialize)]
pub struct BinQuery {
    pub warehouse_id: Option<Uuid>,
}

/// All bins of the farm; `?warehouse_id=` narrows to one warehouse
pub async fn list_all_bins(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BinQuery>,
) -> AppResult<Json<Vec<BinOverview>>> {
    let bins = WarehouseService::new(state.db.clone())
        .list_bins(user.farm_id, query.warehouse_id)
        .await?;
    Ok(Json(bins))
}

pub async fn create_bin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<CreateBinInput>,
) -> AppResult<(StatusCode, Json<Bin>)> {
    let bin = WarehouseService::new(state.db.clone())
        .create_bin(user.farm_id, warehouse_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(bin)))
}

pub async fn get_bin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(bin_id): Path<Uuid>,
) -> AppResult<Json<Bin>> {
    let bin = WarehouseService::new(state.db.clone()).get_bin(user.farm_id, bin_id).await?;
    Ok(Json(bin))
}

pub async fn update_bin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(bin_id): Path<Uuid>,
    Json(input): Json<UpdateBinInput>,
) -> AppResult<Json<Bin>> {
    let bin = WarehouseService::new(state.db.clone())
        .update_bin(user.farm_id, bin_id, input)
        .await?;
    Ok(Json(bin))
}

pub async fn delete_bin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(bin_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    WarehouseService::new(state.db.clone())
        .delete_bin(user.farm_id, bin_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
