use axum::{
    extract::{Path, State},
    Json,
};
use shared::Profile;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ProfileService;
use crate::AppState;

/// Profile of the signed-in user, with the farm name
pub async fn get_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Profile>> {
    let profile = ProfileService::new(state.db.clone())
        .get_profile(user.user_id)
        .await?;
    Ok(Json(profile))
}

/// Members of the caller's farm
pub async fn list_profiles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Profile>>> {
    let profiles = ProfileService::new(state.db.clone()).list_profiles(user.farm_id).await?;
    Ok(Json(profiles))
}

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    let profile = ProfileService::new(state.db.clone())
        .get_farm_profile(user.farm_id, profile_id)
        .await?;
    Ok(Json(profile))
}
