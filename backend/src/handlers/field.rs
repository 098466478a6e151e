//! Field management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{CreateFieldInput, Field, FieldWithUsage, UpdateFieldInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::FieldService;
use crate::AppState;

/// List fields with their lot and work counts
pub async fn list_fields(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<FieldWithUsage>>> {
    let fields = FieldService::new(state.db.clone()).list_fields(user.farm_id).await?;
    Ok(Json(fields))
}

pub async fn get_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(field_id): Path<Uuid>,
) -> AppResult<Json<FieldWithUsage>> {
    let field = FieldService::new(state.db.clone())
        .get_field(user.farm_id, field_id)
        .await?;
    Ok(Json(field))
}

pub async fn create_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateFieldInput>,
) -> AppResult<(StatusCode, Json<Field>)> {
    let field = FieldService::new(state.db.clone())
        .create_field(user.farm_id, input)
        .await?;
    state.master_data.invalidate(user.farm_id).await;
    Ok((StatusCode::CREATED, Json(field)))
}

pub async fn update_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(field_id): Path<Uuid>,
    Json(input): Json<UpdateFieldInput>,
) -> AppResult<Json<Field>> {
    let field = FieldService::new(state.db.clone())
        .update_field(user.farm_id, field_id, input)
        .await?;
    state.master_data.invalidate(user.farm_id).await;
    Ok(Json(field))
}

/// Blocked while lots or works reference the field
pub async fn delete_field(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(field_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    FieldService::new(state.db.clone())
        .delete_field(user.farm_id, field_id)
        .await?;
    state.master_data.invalidate(user.farm_id).await;
    Ok(StatusCode::NO_CONTENT)
}
