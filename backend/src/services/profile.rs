//! Profiles of the farm's members

use shared::Profile;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.farm_id, f.name AS farm_name, p.full_name, p.role, p.language, p.created_at
    FROM profiles p
    JOIN farms f ON f.id = p.farm_id
"#;

#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(&format!("{PROFILE_SELECT} WHERE p.id = $1"))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }

    pub async fn list_profiles(&self, farm_id: Uuid) -> AppResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            "{PROFILE_SELECT} WHERE p.farm_id = $1 ORDER BY p.full_name"
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(profiles)
    }

    /// A member of the same farm
    pub async fn get_farm_profile(&self, farm_id: Uuid, profile_id: Uuid) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(&format!("{PROFILE_SELECT} WHERE p.id = $1 AND p.farm_id = $2"))
            .bind(profile_id)
            .bind(farm_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }
}
