//! Field management service

use shared::{CreateFieldInput, Dependents, Field, FieldWithUsage, UpdateFieldInput};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;

const FIELD_COLUMNS: &str =
    "f.id, f.farm_id, f.name, f.area_ha, f.location, f.crop_id, f.notes, f.created_at, f.updated_at";

#[derive(FromRow)]
struct FieldUsageRow {
    #[sqlx(flatten)]
    field: Field,
    lot_count: i64,
    work_count: i64,
}

impl From<FieldUsageRow> for FieldWithUsage {
    fn from(row: FieldUsageRow) -> Self {
        FieldWithUsage {
            field: row.field,
            lot_count: row.lot_count,
            work_count: row.work_count,
        }
    }
}

#[derive(Clone)]
pub struct FieldService {
    db: PgPool,
}

impl FieldService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All fields with the counts that decide whether they can be deleted
    pub async fn list_fields(&self, farm_id: Uuid) -> AppResult<Vec<FieldWithUsage>> {
        let rows = sqlx::query_as::<_, FieldUsageRow>(&format!(
            r#"
            SELECT {FIELD_COLUMNS},
                   (SELECT COUNT(*) FROM lots l WHERE l.field_id = f.id) AS lot_count,
                   (SELECT COUNT(*) FROM works w WHERE w.field_id = f.id) AS work_count
            FROM fields f
            WHERE f.farm_id = $1
            ORDER BY f.name
            "#
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(FieldWithUsage::from).collect())
    }

    pub async fn get_field(&self, farm_id: Uuid, field_id: Uuid) -> AppResult<FieldWithUsage> {
        sqlx::query_as::<_, FieldUsageRow>(&format!(
            r#"
            SELECT {FIELD_COLUMNS},
                   (SELECT COUNT(*) FROM lots l WHERE l.field_id = f.id) AS lot_count,
                   (SELECT COUNT(*) FROM works w WHERE w.field_id = f.id) AS work_count
            FROM fields f
            WHERE f.id = $1 AND f.farm_id = $2
            "#
        ))
        .bind(field_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .map(FieldWithUsage::from)
        .ok_or_else(|| AppError::NotFound("Field".to_string()))
    }

    pub async fn create_field(&self, farm_id: Uuid, input: CreateFieldInput) -> AppResult<Field> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        if let Some(crop_id) = input.crop_id {
            ensure_owned(&mut tx, "crops", "Crop", crop_id, farm_id).await?;
        }

        let field = sqlx::query_as::<_, Field>(
            r#"
            INSERT INTO fields (farm_id, name, area_ha, location, crop_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, farm_id, name, area_ha, location, crop_id, notes, created_at, updated_at
            "#,
        )
        .bind(farm_id)
        .bind(&input.name)
        .bind(input.area_ha)
        .bind(&input.location)
        .bind(input.crop_id)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(%farm_id, field_id = %field.id, "field created");
        Ok(field)
    }

    pub async fn update_field(
        &self,
        farm_id: Uuid,
        field_id: Uuid,
        input: UpdateFieldInput,
    ) -> AppResult<Field> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        if let Some(crop_id) = input.crop_id {
            ensure_owned(&mut tx, "crops", "Crop", crop_id, farm_id).await?;
        }

        let field = sqlx::query_as::<_, Field>(
            r#"
            UPDATE fields
            SET name = COALESCE($3, name),
                area_ha = COALESCE($4, area_ha),
                location = COALESCE($5, location),
                crop_id = COALESCE($6, crop_id),
                notes = COALESCE($7, notes),
                updated_at = now()
            WHERE id = $1 AND farm_id = $2
            RETURNING id, farm_id, name, area_ha, location, crop_id, notes, created_at, updated_at
            "#,
        )
        .bind(field_id)
        .bind(farm_id)
        .bind(&input.name)
        .bind(input.area_ha)
        .bind(&input.location)
        .bind(input.crop_id)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Field".to_string()))?;
        tx.commit().await?;

        Ok(field)
    }

    /// Delete a field that no lot or work references
    pub async fn delete_field(&self, farm_id: Uuid, field_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM fields WHERE id = $1 AND farm_id = $2 FOR UPDATE",
        )
        .bind(field_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Field".to_string()));
        }

        let (lot_count, work_count) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT (SELECT COUNT(*) FROM lots WHERE field_id = $1),
                   (SELECT COUNT(*) FROM works WHERE field_id = $1)
            "#,
        )
        .bind(field_id)
        .fetch_one(&mut *tx)
        .await?;

        field_delete_guard(lot_count, work_count).map_err(|err| {
            tracing::warn!(%farm_id, %field_id, error = %err, "field delete blocked");
            err
        })?;

        sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(field_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(%farm_id, %field_id, "field deleted");
        Ok(())
    }
}

/// A field can only go once no lot or work points at it
pub fn field_delete_guard(lot_count: i64, work_count: i64) -> AppResult<()> {
    Dependents::new()
        .with("lots", lot_count)
        .with("works", work_count)
        .ensure_none()
        .map_err(|dependents| AppError::DeleteBlocked {
            resource: "field".to_string(),
            dependents,
        })
}
