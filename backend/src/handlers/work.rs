//! Field work HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{CreateWorkInput, Pagination, UpdateWorkInput, Work, WorkFilter};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::WorkService;
use crate::AppState;

pub async fn list_works(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<WorkFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Vec<Work>>> {
    let works = WorkService::new(state.db.clone())
        .list_works(user.farm_id, &filter, &pagination)
        .await?;
    Ok(Json(works))
}

pub async fn get_work(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(work_id): Path<Uuid>,
) -> AppResult<Json<Work>> {
    let work = WorkService::new(state.db.clone()).get_work(user.farm_id, work_id).await?;
    Ok(Json(work))
}

pub async fn create_work(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateWorkInput>,
) -> AppResult<(StatusCode, Json<Work>)> {
    let work = WorkService::new(state.db.clone()).create_work(user.farm_id, input).await?;
    Ok((StatusCode::CREATED, Json(work)))
}

pub async fn update_work(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(work_id): Path<Uuid>,
    Json(input): Json<UpdateWorkInput>,
) -> AppResult<Json<Work>> {
    let work = WorkService::new(state.db.clone())
        .update_work(user.farm_id, work_id, input)
        .await?;
    Ok(Json(work))
}

pub async fn delete_work(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(work_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    WorkService::new(state.db.clone()).delete_work(user.farm_id, work_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
