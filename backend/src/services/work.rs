//! Field work service

use shared::{CreateWorkInput, Pagination, UpdateWorkInput, Work, WorkFilter};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;

const WORK_COLUMNS: &str =
    "id, farm_id, field_id, work_type_id, season_id, work_date, cost_gel, notes, created_at";

#[derive(Clone)]
pub struct WorkService {
    db: PgPool,
}

impl WorkService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_works(
        &self,
        farm_id: Uuid,
        filter: &WorkFilter,
        pagination: &Pagination,
    ) -> AppResult<Vec<Work>> {
        let (limit, offset) = pagination.limit_offset();

        let works = sqlx::query_as::<_, Work>(&format!(
            r#"
            SELECT {WORK_COLUMNS}
            FROM works
            WHERE farm_id = $1
              AND ($2::uuid IS NULL OR field_id = $2)
              AND ($3::uuid IS NULL OR season_id = $3)
            ORDER BY work_date DESC, created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(farm_id)
        .bind(filter.field_id)
        .bind(filter.season_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(works)
    }

    pub async fn get_work(&self, farm_id: Uuid, work_id: Uuid) -> AppResult<Work> {
        sqlx::query_as::<_, Work>(&format!(
            "SELECT {WORK_COLUMNS} FROM works WHERE id = $1 AND farm_id = $2"
        ))
        .bind(work_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Work".to_string()))
    }

    pub async fn create_work(&self, farm_id: Uuid, input: CreateWorkInput) -> AppResult<Work> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        ensure_owned(&mut tx, "fields", "Field", input.field_id, farm_id).await?;
        ensure_owned(&mut tx, "work_types", "Work type", input.work_type_id, farm_id).await?;
        if let Some(season_id) = input.season_id {
            ensure_owned(&mut tx, "seasons", "Season", season_id, farm_id).await?;
        }

        let work = sqlx::query_as::<_, Work>(&format!(
            r#"
            INSERT INTO works (farm_id, field_id, work_type_id, season_id, work_date, cost_gel, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {WORK_COLUMNS}
            "#
        ))
        .bind(farm_id)
        .bind(input.field_id)
        .bind(input.work_type_id)
        .bind(input.season_id)
        .bind(input.work_date)
        .bind(input.cost_gel)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(%farm_id, work_id = %work.id, field_id = %work.field_id, "work recorded");
        Ok(work)
    }

    pub async fn update_work(&self, farm_id: Uuid, work_id: Uuid, input: UpdateWorkInput) -> AppResult<Work> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        if let Some(work_type_id) = input.work_type_id {
            ensure_owned(&mut tx, "work_types", "Work type", work_type_id, farm_id).await?;
        }
        if let Some(season_id) = input.season_id {
            ensure_owned(&mut tx, "seasons", "Season", season_id, farm_id).await?;
        }

        let work = sqlx::query_as::<_, Work>(&format!(
            r#"
            UPDATE works
            SET work_type_id = COALESCE($3, work_type_id),
                season_id = COALESCE($4, season_id),
                work_date = COALESCE($5, work_date),
                cost_gel = COALESCE($6, cost_gel),
                notes = COALESCE($7, notes)
            WHERE id = $1 AND farm_id = $2
            RETURNING {WORK_COLUMNS}
            "#
        ))
        .bind(work_id)
        .bind(farm_id)
        .bind(input.work_type_id)
        .bind(input.season_id)
        .bind(input.work_date)
        .bind(input.cost_gel)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Work".to_string()))?;
        tx.commit().await?;

        Ok(work)
    }

    pub async fn delete_work(&self, farm_id: Uuid, work_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM works WHERE id = $1 AND farm_id = $2")
            .bind(work_id)
            .bind(farm_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Work".to_string()));
        }
        tracing::info!(%farm_id, %work_id, "work deleted");
        Ok(())
    }
}
