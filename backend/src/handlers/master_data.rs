use axum::{extract::State, Json};
use shared::MasterData;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::MasterDataService;
use crate::AppState;

/// Seasons, crops, fields, warehouses and work types in one payload
pub async fn get_master_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<MasterData>> {
    let data = MasterDataService::new(state.db.clone(), state.master_data.clone())
        .get(user.farm_id)
        .await?;
    Ok(Json(MasterData::clone(&data)))
}

/// Drop the cached copy and load it again
pub async fn refresh_master_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<MasterData>> {
    let data = MasterDataService::new(state.db.clone(), state.master_data.clone())
        .refresh(user.farm_id)
        .await?;
    Ok(Json(MasterData::clone(&data)))
}
