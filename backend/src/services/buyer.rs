//! Buyer directory service

use shared::{Buyer, CreateBuyerInput, Dependents, UpdateBuyerInput};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BuyerService {
    db: PgPool,
}

impl BuyerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_buyers(&self, farm_id: Uuid) -> AppResult<Vec<Buyer>> {
        let buyers = sqlx::query_as::<_, Buyer>(
            r#"
            SELECT id, farm_id, name, phone, tax_id, notes, created_at
            FROM buyers
            WHERE farm_id = $1
            ORDER BY name
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(buyers)
    }

    pub async fn get_buyer(&self, farm_id: Uuid, buyer_id: Uuid) -> AppResult<Buyer> {
        sqlx::query_as::<_, Buyer>(
            "SELECT id, farm_id, name, phone, tax_id, notes, created_at FROM buyers WHERE id = $1 AND farm_id = $2",
        )
        .bind(buyer_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Buyer".to_string()))
    }

    pub async fn create_buyer(&self, farm_id: Uuid, input: CreateBuyerInput) -> AppResult<Buyer> {
        input.validate()?;

        let buyer = sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (farm_id, name, phone, tax_id, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, farm_id, name, phone, tax_id, notes, created_at
            "#,
        )
        .bind(farm_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.tax_id)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(%farm_id, buyer_id = %buyer.id, "buyer created");
        Ok(buyer)
    }

    pub async fn update_buyer(&self, farm_id: Uuid, buyer_id: Uuid, input: UpdateBuyerInput) -> AppResult<Buyer> {
        input.validate()?;

        sqlx::query_as::<_, Buyer>(
            r#"
            UPDATE buyers
            SET name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                tax_id = COALESCE($5, tax_id),
                notes = COALESCE($6, notes)
            WHERE id = $1 AND farm_id = $2
            RETURNING id, farm_id, name, phone, tax_id, notes, created_at
            "#,
        )
        .bind(buyer_id)
        .bind(farm_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.tax_id)
        .bind(&input.notes)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Buyer".to_string()))
    }

    /// Buyers with sales stay on record
    pub async fn delete_buyer(&self, farm_id: Uuid, buyer_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM buyers WHERE id = $1 AND farm_id = $2 FOR UPDATE",
        )
        .bind(buyer_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Buyer".to_string()));
        }

        let sale_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE buyer_id = $1")
            .bind(buyer_id)
            .fetch_one(&mut *tx)
            .await?;

        buyer_delete_guard(sale_count)?;

        sqlx::query("DELETE FROM buyers WHERE id = $1")
            .bind(buyer_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(%farm_id, %buyer_id, "buyer deleted");
        Ok(())
    }
}

pub fn buyer_delete_guard(sale_count: i64) -> AppResult<()> {
    Dependents::new()
        .with("sales", sale_count)
        .ensure_none()
        .map_err(|dependents| AppError::DeleteBlocked {
            resource: "buyer".to_string(),
            dependents,
        })
}
