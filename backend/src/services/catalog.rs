//! Read-only catalog: seasons, crops, varieties and work types

use shared::{Crop, Season, Variety, WorkType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Newest season first
    pub async fn list_seasons(&self, farm_id: Uuid) -> AppResult<Vec<Season>> {
        let seasons = sqlx::query_as::<_, Season>(
            r#"
            SELECT id, farm_id, name, start_date, end_date, is_active, created_at
            FROM seasons
            WHERE farm_id = $1
            ORDER BY start_date DESC
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(seasons)
    }

    pub async fn get_season(&self, farm_id: Uuid, season_id: Uuid) -> AppResult<Season> {
        sqlx::query_as::<_, Season>(
            r#"
            SELECT id, farm_id, name, start_date, end_date, is_active, created_at
            FROM seasons
            WHERE id = $1 AND farm_id = $2
            "#,
        )
        .bind(season_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Season".to_string()))
    }

    pub async fn list_crops(&self, farm_id: Uuid) -> AppResult<Vec<Crop>> {
        let crops = sqlx::query_as::<_, Crop>(
            "SELECT id, farm_id, name, created_at FROM crops WHERE farm_id = $1 ORDER BY name",
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(crops)
    }

    pub async fn get_crop(&self, farm_id: Uuid, crop_id: Uuid) -> AppResult<Crop> {
        sqlx::query_as::<_, Crop>("SELECT id, farm_id, name, created_at FROM crops WHERE id = $1 AND farm_id = $2")
            .bind(crop_id)
            .bind(farm_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Crop".to_string()))
    }

    /// Varieties of the farm's crops, optionally narrowed to one crop
    pub async fn list_varieties(&self, farm_id: Uuid, crop_id: Option<Uuid>) -> AppResult<Vec<Variety>> {
        let varieties = sqlx::query_as::<_, Variety>(
            r#"
            SELECT v.id, v.crop_id, v.name, v.created_at
            FROM varieties v
            JOIN crops c ON c.id = v.crop_id
            WHERE c.farm_id = $1 AND ($2::uuid IS NULL OR v.crop_id = $2)
            ORDER BY v.name
            "#,
        )
        .bind(farm_id)
        .bind(crop_id)
        .fetch_all(&self.db)
        .await?;

        Ok(varieties)
    }

    pub async fn get_variety(&self, farm_id: Uuid, variety_id: Uuid) -> AppResult<Variety> {
        sqlx::query_as::<_, Variety>(
            r#"
            SELECT v.id, v.crop_id, v.name, v.created_at
            FROM varieties v
            JOIN crops c ON c.id = v.crop_id
            WHERE v.id = $1 AND c.farm_id = $2
            "#,
        )
        .bind(variety_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Variety".to_string()))
    }

    pub async fn list_work_types(&self, farm_id: Uuid) -> AppResult<Vec<WorkType>> {
        let work_types = sqlx::query_as::<_, WorkType>(
            "SELECT id, farm_id, name, created_at FROM work_types WHERE farm_id = $1 ORDER BY name",
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(work_types)
    }

    pub async fn get_work_type(&self, farm_id: Uuid, work_type_id: Uuid) -> AppResult<WorkType> {
        sqlx::query_as::<_, WorkType>(
            "SELECT id, farm_id, name, created_at FROM work_types WHERE id = $1 AND farm_id = $2",
        )
        .bind(work_type_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Work type".to_string()))
    }
}
