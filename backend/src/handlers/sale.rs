//! Sales HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{CreateSaleInput, Pagination, Sale, SaleFilter, UpdateSaleInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SaleService;
use crate::AppState;

pub async fn list_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<SaleFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Vec<Sale>>> {
    let sales = SaleService::new(state.db.clone())
        .list_sales(user.farm_id, &filter, &pagination)
        .await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let sale = SaleService::new(state.db.clone()).get_sale(user.farm_id, sale_id).await?;
    Ok(Json(sale))
}

/// Sale plus its SALE_OUT movement, all or nothing
///
/// Served on both `/sales` and `/rpc/create_sale_atomic`.
pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    let sale = SaleService::new(state.db.clone())
        .create_sale_atomic(user.farm_id, user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn update_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<Sale>> {
    let sale = SaleService::new(state.db.clone())
        .update_sale(user.farm_id, sale_id, input)
        .await?;
    Ok(Json(sale))
}

/// Delete a sale, returning its weight to the bin
pub async fn delete_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    SaleService::new(state.db.clone()).delete_sale(user.farm_id, sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
