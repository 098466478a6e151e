//! Catalog handlers (read-only)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{Crop, Season, Variety, WorkType};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CatalogService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VarietyQuery {
    pub crop_id: Option<Uuid>,
}

pub async fn list_seasons(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Season>>> {
    let seasons = CatalogService::new(state.db.clone()).list_seasons(user.farm_id).await?;
    Ok(Json(seasons))
}

pub async fn get_season(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(season_id): Path<Uuid>,
) -> AppResult<Json<Season>> {
    let season = CatalogService::new(state.db.clone())
        .get_season(user.farm_id, season_id)
        .await?;
    Ok(Json(season))
}

pub async fn list_crops(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Crop>>> {
    let crops = CatalogService::new(state.db.clone()).list_crops(user.farm_id).await?;
    Ok(Json(crops))
}

pub async fn get_crop(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(crop_id): Path<Uuid>,
) -> AppResult<Json<Crop>> {
    let crop = CatalogService::new(state.db.clone()).get_crop(user.farm_id, crop_id).await?;
    Ok(Json(crop))
}

/// Varieties of one crop
pub async fn list_crop_varieties(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(crop_id): Path<Uuid>,
) -> AppResult<Json<Vec<Variety>>> {
    let varieties = CatalogService::new(state.db.clone())
        .list_varieties(user.farm_id, Some(crop_id))
        .await?;
    Ok(Json(varieties))
}

/// Flat variety list, `?crop_id=` narrows it to one crop
pub async fn list_varieties(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<VarietyQuery>,
) -> AppResult<Json<Vec<Variety>>> {
    let varieties = CatalogService::new(state.db.clone())
        .list_varieties(user.farm_id, query.crop_id)
        .await?;
    Ok(Json(varieties))
}

pub async fn get_variety(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(variety_id): Path<Uuid>,
) -> AppResult<Json<Variety>> {
    let variety = CatalogService::new(state.db.clone())
        .get_variety(user.farm_id, variety_id)
        .await?;
    Ok(Json(variety))
}

pub async fn list_work_types(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<WorkType>>> {
    let work_types = CatalogService::new(state.db.clone())
        .list_work_types(user.farm_id)
        .await?;
    Ok(Json(work_types))
}

pub async fn get_work_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(work_type_id): Path<Uuid>,
) -> AppResult<Json<WorkType>> {
    let work_type = CatalogService::new(state.db.clone())
        .get_work_type(user.farm_id, work_type_id)
        .await?;
    Ok(Json(work_type))
}
