//! Lot management service
//!
//! Lots are created by the intake wizard: the lot row first, then a RECEIVE
//! movement into the chosen bin. The backend runs both steps in one
//! transaction through [`run_lot_intake`], the same saga the client SDK runs
//! over HTTP.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::saga::{run_lot_intake, LotIntakeOutcome, LotIntakeStore, ReceiptDraft};
use shared::{
    BinLotStock, CreateLotInput, Dependents, InventoryMovement, Lot, LotDetail, LotFilter,
    LotIntakeInput, MovementDraft, UpdateLotInput,
};
use sqlx::{Connection, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;
use crate::services::inventory::{self, NewMovement};

const LOT_COLUMNS: &str = "id, farm_id, season_id, lot_code, crop_id, variety_id, field_id, \
     harvested_kg, harvest_date, notes, created_at, updated_at";

/// Lot service for creating, reading and deleting lots
#[derive(Clone)]
pub struct LotService {
    db: PgPool,
}

impl LotService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_lots(&self, farm_id: Uuid, filter: &LotFilter) -> AppResult<Vec<Lot>> {
        let lots = sqlx::query_as::<_, Lot>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM lots
            WHERE farm_id = $1
              AND ($2::uuid IS NULL OR season_id = $2)
              AND ($3::uuid IS NULL OR field_id = $3)
              AND ($4::uuid IS NULL OR crop_id = $4)
            ORDER BY harvest_date DESC, lot_code
            "#
        ))
        .bind(farm_id)
        .bind(filter.season_id)
        .bind(filter.field_id)
        .bind(filter.crop_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lots)
    }

    /// Lot with its current bins, sales totals and ledger history
    pub async fn get_lot(&self, farm_id: Uuid, lot_id: Uuid) -> AppResult<LotDetail> {
        let lot = sqlx::query_as::<_, Lot>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots WHERE id = $1 AND farm_id = $2"
        ))
        .bind(lot_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        let stock = sqlx::query_as::<_, BinLotStock>(
            "SELECT bin_id, lot_id, stock_kg FROM v_bin_lot_stock WHERE lot_id = $1 AND stock_kg > 0",
        )
        .bind(lot_id)
        .fetch_all(&self.db)
        .await?;

        let (sale_count, sold_kg) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(weight_kg), 0) FROM sales WHERE lot_id = $1",
        )
        .bind(lot_id)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, farm_id, movement_type, lot_id, from_bin_id, to_bin_id, weight_kg,
                   movement_date, sale_id, notes, created_by, created_at
            FROM inventory_movements
            WHERE lot_id = $1
            ORDER BY movement_date, created_at
            "#,
        )
        .bind(lot_id)
        .fetch_all(&self.db)
        .await?;

        let stock_kg = stock.iter().map(|s| s.stock_kg).sum();

        Ok(LotDetail {
            lot,
            stock,
            stock_kg,
            sold_kg,
            sale_count,
            movements,
        })
    }

    /// Insert a lot without a receipt (first step of the client-side intake)
    pub async fn create_lot(&self, farm_id: Uuid, input: CreateLotInput) -> AppResult<Lot> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let lot = insert_lot_row(&mut tx, farm_id, &input).await?;
        tx.commit().await?;

        tracing::info!(%farm_id, lot_id = %lot.id, lot_code = %lot.lot_code, "lot created");
        Ok(lot)
    }

    /// Create a lot and receive its harvest into a bin, all or nothing
    pub async fn intake(
        &self,
        farm_id: Uuid,
        user_id: Uuid,
        input: LotIntakeInput,
    ) -> AppResult<LotIntakeOutcome<Lot, InventoryMovement>> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut store = PgLotIntakeStore {
            conn: &mut *tx,
            farm_id,
            user_id,
        };

        let outcome = run_lot_intake(&mut store, &input).await.map_err(|e| e.into_cause())?;
        tx.commit().await?;

        Ok(outcome)
    }

    /// `harvested_kg` is not editable; later quantities live in the ledger
    pub async fn update_lot(&self, farm_id: Uuid, lot_id: Uuid, input: UpdateLotInput) -> AppResult<Lot> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        if let Some(variety_id) = input.variety_id {
            let crop_id = sqlx::query_scalar::<_, Uuid>(
                "SELECT crop_id FROM lots WHERE id = $1 AND farm_id = $2",
            )
            .bind(lot_id)
            .bind(farm_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;
            ensure_variety_of_crop(&mut tx, variety_id, crop_id).await?;
        }

        let lot = sqlx::query_as::<_, Lot>(&format!(
            r#"
            UPDATE lots
            SET lot_code = COALESCE($3, lot_code),
                variety_id = COALESCE($4, variety_id),
                notes = COALESCE($5, notes),
                updated_at = now()
            WHERE id = $1 AND farm_id = $2
            RETURNING {LOT_COLUMNS}
            "#
        ))
        .bind(lot_id)
        .bind(farm_id)
        .bind(&input.lot_code)
        .bind(input.variety_id)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        tx.commit().await?;
        Ok(lot)
    }

    /// Delete a lot and its ledger rows; blocked while sales reference it
    pub async fn delete_lot(&self, farm_id: Uuid, lot_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        delete_lot_in_tx(&mut tx, farm_id, lot_id).await?;
        tx.commit().await?;

        tracing::info!(%farm_id, %lot_id, "lot deleted");
        Ok(())
    }
}

/// Check the lot's references and insert it
async fn insert_lot_row(conn: &mut PgConnection, farm_id: Uuid, input: &CreateLotInput) -> AppResult<Lot> {
    ensure_owned(conn, "seasons", "Season", input.season_id, farm_id).await?;
    ensure_owned(conn, "crops", "Crop", input.crop_id, farm_id).await?;
    ensure_owned(conn, "fields", "Field", input.field_id, farm_id).await?;
    if let Some(variety_id) = input.variety_id {
        ensure_variety_of_crop(conn, variety_id, input.crop_id).await?;
    }

    let lot = sqlx::query_as::<_, Lot>(&format!(
        r#"
        INSERT INTO lots (
            farm_id, season_id, lot_code, crop_id, variety_id, field_id,
            harvested_kg, harvest_date, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {LOT_COLUMNS}
        "#
    ))
    .bind(farm_id)
    .bind(input.season_id)
    .bind(&input.lot_code)
    .bind(input.crop_id)
    .bind(input.variety_id)
    .bind(input.field_id)
    .bind(input.harvested_kg)
    .bind(input.harvest_date)
    .bind(&input.notes)
    .fetch_one(&mut *conn)
    .await?;

    Ok(lot)
}

async fn ensure_variety_of_crop(conn: &mut PgConnection, variety_id: Uuid, crop_id: Uuid) -> AppResult<()> {
    let matches = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM varieties WHERE id = $1 AND crop_id = $2)",
    )
    .bind(variety_id)
    .bind(crop_id)
    .fetch_one(&mut *conn)
    .await?;

    if matches {
        Ok(())
    } else {
        Err(AppError::validation(
            "variety_id",
            "Variety does not belong to the lot's crop",
            "ჯიში არ ეკუთვნის ლოტის კულტურას",
        ))
    }
}

/// A lot that has been sold from cannot be deleted
pub fn lot_delete_guard(sale_count: i64) -> AppResult<()> {
    Dependents::new()
        .with("sales", sale_count)
        .ensure_none()
        .map_err(|dependents| AppError::DeleteBlocked {
            resource: "lot".to_string(),
            dependents,
        })
}

async fn delete_lot_in_tx(conn: &mut PgConnection, farm_id: Uuid, lot_id: Uuid) -> AppResult<()> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM lots WHERE id = $1 AND farm_id = $2 FOR UPDATE")
        .bind(lot_id)
        .bind(farm_id)
        .fetch_optional(&mut *conn)
        .await?;
    if locked.is_none() {
        return Err(AppError::NotFound("Lot".to_string()));
    }

    let sale_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE lot_id = $1")
        .bind(lot_id)
        .fetch_one(&mut *conn)
        .await?;

    lot_delete_guard(sale_count).map_err(|err| {
        tracing::warn!(%farm_id, %lot_id, error = %err, "lot delete blocked");
        err
    })?;

    let movements = sqlx::query_as::<_, InventoryMovement>(
        r#"
        SELECT id, farm_id, movement_type, lot_id, from_bin_id, to_bin_id, weight_kg,
               movement_date, sale_id, notes, created_by, created_at
        FROM inventory_movements
        WHERE lot_id = $1
        "#,
    )
    .bind(lot_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut bins: Vec<Uuid> = movements
        .iter()
        .flat_map(|m| MovementDraft::from(m).touched_bins())
        .collect();
    bins.sort();
    bins.dedup();
    inventory::lock_bins(conn, farm_id, &bins).await?;

    sqlx::query("DELETE FROM inventory_movements WHERE lot_id = $1")
        .bind(lot_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM lots WHERE id = $1")
        .bind(lot_id)
        .execute(&mut *conn)
        .await?;
    inventory::refresh_active_lots(conn, &bins).await?;

    Ok(())
}

/// Lot intake steps against an open Postgres transaction
///
/// The receipt runs in a savepoint so a rejected movement leaves the
/// transaction usable for the compensating delete.
pub struct PgLotIntakeStore<'c> {
    conn: &'c mut PgConnection,
    farm_id: Uuid,
    user_id: Uuid,
}

#[async_trait]
impl<'c> LotIntakeStore for PgLotIntakeStore<'c> {
    type Lot = Lot;
    type Movement = InventoryMovement;
    type Error = AppError;

    async fn insert_lot(&mut self, input: &CreateLotInput) -> AppResult<Lot> {
        insert_lot_row(self.conn, self.farm_id, input).await
    }

    fn lot_id(lot: &Lot) -> Uuid {
        lot.id
    }

    async fn insert_receipt(&mut self, receipt: &ReceiptDraft) -> AppResult<InventoryMovement> {
        let movement = NewMovement {
            draft: MovementDraft::receive(receipt.lot_id, receipt.bin_id, receipt.weight_kg),
            movement_date: receipt.movement_date,
            sale_id: None,
            notes: receipt.notes.clone(),
        };

        let mut savepoint = self.conn.begin().await?;
        let recorded =
            inventory::record_in_tx(&mut savepoint, self.farm_id, Some(self.user_id), &movement).await?;
        savepoint.commit().await?;
        Ok(recorded)
    }

    async fn delete_lot(&mut self, lot_id: Uuid) -> AppResult<()> {
        delete_lot_in_tx(self.conn, self.farm_id, lot_id).await
    }
}
