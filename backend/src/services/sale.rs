//! Sales service
//!
//! A sale and its SALE_OUT movement are written in one transaction: either
//! both rows exist afterwards or neither does.

use rust_decimal::Decimal;
use shared::{
    sale_total, CreateSaleInput, MovementDraft, Pagination, Sale, SaleFilter, StockLedger,
    UpdateSaleInput,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use crate::services::inventory::{self, NewMovement};

const SALE_COLUMNS: &str = "id, farm_id, season_id, lot_id, bin_id, buyer_id, sale_date, weight_kg, \
     price_per_kg, total_gel, payment_status, notes, created_by, created_at, updated_at";

/// Check a sale against the current stock of its bin
///
/// Returns the total to store and the SALE_OUT to book. Nothing is written
/// unless this succeeds.
pub fn plan_sale(ledger: &StockLedger, input: &CreateSaleInput) -> AppResult<(Decimal, MovementDraft)> {
    input.validate()?;

    let total_gel = sale_total(input.weight_kg, input.price_per_kg).ok_or_else(|| {
        AppError::validation(
            "price_per_kg",
            "Sale total exceeds the supported range",
            "გაყიდვის ჯამი დასაშვებ ზღვარს აჭარბებს",
        )
    })?;

    let draft = MovementDraft::sale_out(input.lot_id, input.bin_id, input.weight_kg);
    ledger.check(&draft)?;
    Ok((total_gel, draft))
}

#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

impl SaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sale together with the SALE_OUT movement that takes its weight out of the bin
    pub async fn create_sale_atomic(
        &self,
        farm_id: Uuid,
        user_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<Sale> {
        input.validate()?;

        if input.farm_id.is_some_and(|f| f != farm_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let mut tx = self.db.begin().await?;

        ensure_owned(&mut tx, "seasons", "Season", input.season_id, farm_id).await?;
        ensure_owned(&mut tx, "buyers", "Buyer", input.buyer_id, farm_id).await?;

        inventory::lock_bins(&mut tx, farm_id, &[input.bin_id]).await?;
        let ledger = inventory::load_ledger(&mut tx, &[input.bin_id]).await?;
        let (total_gel, draft) = plan_sale(&ledger, &input).map_err(|err| {
            tracing::warn!(%farm_id, lot_id = %input.lot_id, bin_id = %input.bin_id, error = %err, "sale rejected");
            err
        })?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (
                farm_id, season_id, lot_id, bin_id, buyer_id, sale_date,
                weight_kg, price_per_kg, total_gel, payment_status, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(farm_id)
        .bind(input.season_id)
        .bind(input.lot_id)
        .bind(input.bin_id)
        .bind(input.buyer_id)
        .bind(input.sale_date)
        .bind(input.weight_kg)
        .bind(input.price_per_kg)
        .bind(total_gel)
        .bind(input.payment_status)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let movement = NewMovement {
            draft,
            movement_date: input.sale_date,
            sale_id: Some(sale.id),
            notes: input.notes.clone(),
        };
        // an error here drops the transaction, taking the sale row with it
        inventory::record_in_tx(&mut tx, farm_id, Some(user_id), &movement).await?;

        tx.commit().await?;

        tracing::info!(
            %farm_id,
            sale_id = %sale.id,
            lot_id = %sale.lot_id,
            bin_id = %sale.bin_id,
            weight_kg = %sale.weight_kg,
            total_gel = %sale.total_gel,
            "sale created"
        );

        Ok(sale)
    }

    pub async fn list_sales(
        &self,
        farm_id: Uuid,
        filter: &SaleFilter,
        pagination: &Pagination,
    ) -> AppResult<Vec<Sale>> {
        let (limit, offset) = pagination.limit_offset();

        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE farm_id = $1
              AND ($2::uuid IS NULL OR season_id = $2)
              AND ($3::uuid IS NULL OR lot_id = $3)
              AND ($4::uuid IS NULL OR buyer_id = $4)
              AND ($5::payment_status IS NULL OR payment_status = $5)
            ORDER BY sale_date DESC, created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(farm_id)
        .bind(filter.season_id)
        .bind(filter.lot_id)
        .bind(filter.buyer_id)
        .bind(filter.payment_status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    pub async fn get_sale(&self, farm_id: Uuid, sale_id: Uuid) -> AppResult<Sale> {
        sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 AND farm_id = $2"
        ))
        .bind(sale_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }

    /// Only payment status and notes change after a sale; weights live in the ledger
    pub async fn update_sale(
        &self,
        farm_id: Uuid,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> AppResult<Sale> {
        input.validate()?;

        sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales
            SET payment_status = COALESCE($3, payment_status),
                notes = COALESCE($4, notes),
                updated_at = now()
            WHERE id = $1 AND farm_id = $2
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(sale_id)
        .bind(farm_id)
        .bind(input.payment_status)
        .bind(&input.notes)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }

    /// Delete a sale and its SALE_OUT movement, returning the weight to the bin
    pub async fn delete_sale(&self, farm_id: Uuid, sale_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 AND farm_id = $2 FOR UPDATE"
        ))
        .bind(sale_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let bins = [sale.bin_id];
        inventory::lock_bins(&mut tx, farm_id, &bins).await?;
        let ledger = inventory::load_ledger(&mut tx, &bins).await?;
        ledger.check_removal(&MovementDraft::sale_out(sale.lot_id, sale.bin_id, sale.weight_kg))?;

        sqlx::query("DELETE FROM inventory_movements WHERE sale_id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;
        inventory::refresh_active_lots(&mut tx, &bins).await?;

        tx.commit().await?;

        tracing::info!(%farm_id, %sale_id, "sale deleted");
        Ok(())
    }
}
