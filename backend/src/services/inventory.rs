//! Inventory ledger service: movements and the stock view
//!
//! Every write runs inside a transaction that first locks the touched bins
//! (ascending id order), then checks the movement against their current
//! balances. The database trigger repeats the check for writers that bypass
//! this service.

use chrono::{NaiveDate, Utc};
use shared::{
    BinLotStock, InventoryMovement, MovementDraft, MovementFilter, MovementType, Pagination,
    RecordMovementInput, StockLedger, StockLine,
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

const MOVEMENT_COLUMNS: &str = "id, farm_id, movement_type, lot_id, from_bin_id, to_bin_id, weight_kg, \
     movement_date, sale_id, notes, created_by, created_at";

/// A movement about to be written, with its bookkeeping fields
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub draft: MovementDraft,
    pub movement_date: NaiveDate,
    pub sale_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Inventory service for recording movements and reading stock
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a movement entered by a user
    pub async fn record_movement(
        &self,
        farm_id: Uuid,
        user_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<InventoryMovement> {
        input.validate()?;

        if input.movement_type == MovementType::SaleOut {
            return Err(AppError::validation(
                "movement_type",
                "SALE_OUT movements are created through sales",
                "გაყიდვის მოძრაობა იქმნება გაყიდვის რეგისტრაციით",
            ));
        }

        let movement = NewMovement {
            draft: MovementDraft::from(&input),
            movement_date: input.movement_date.unwrap_or_else(|| Utc::now().date_naive()),
            sale_id: None,
            notes: input.notes,
        };

        let mut tx = self.db.begin().await?;
        let recorded = record_in_tx(&mut tx, farm_id, Some(user_id), &movement).await?;
        tx.commit().await?;

        Ok(recorded)
    }

    pub async fn list_movements(
        &self,
        farm_id: Uuid,
        filter: &MovementFilter,
        pagination: &Pagination,
    ) -> AppResult<Vec<InventoryMovement>> {
        let (limit, offset) = pagination.limit_offset();

        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM inventory_movements
            WHERE farm_id = $1
              AND ($2::uuid IS NULL OR lot_id = $2)
              AND ($3::uuid IS NULL OR from_bin_id = $3 OR to_bin_id = $3)
              AND ($4::movement_type IS NULL OR movement_type = $4)
            ORDER BY movement_date DESC, created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(farm_id)
        .bind(filter.lot_id)
        .bind(filter.bin_id)
        .bind(filter.movement_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    pub async fn get_movement(&self, farm_id: Uuid, movement_id: Uuid) -> AppResult<InventoryMovement> {
        sqlx::query_as::<_, InventoryMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements WHERE id = $1 AND farm_id = $2"
        ))
        .bind(movement_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))
    }

    /// Administrative cleanup of a single movement
    ///
    /// Refused for SALE_OUT movements (delete the sale instead) and whenever
    /// the remaining ledger would break a balance or the no-mixing rule.
    pub async fn delete_movement(&self, farm_id: Uuid, movement_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let movement = sqlx::query_as::<_, InventoryMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements WHERE id = $1 AND farm_id = $2 FOR UPDATE"
        ))
        .bind(movement_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))?;

        if movement.sale_id.is_some() {
            return Err(AppError::Conflict {
                resource: "movement".to_string(),
                message: "Sale movements are removed by deleting the sale".to_string(),
                message_ka: "გაყიდვის მოძრაობა იშლება გაყიდვასთან ერთად".to_string(),
            });
        }

        let draft = MovementDraft::from(&movement);
        let bins = draft.touched_bins();
        lock_bins(&mut tx, farm_id, &bins).await?;
        let ledger = load_ledger(&mut tx, &bins).await?;

        if let Err(violation) = ledger.check_removal(&draft) {
            tracing::warn!(%farm_id, %movement_id, %violation, "movement removal rejected");
            return Err(violation.into());
        }

        sqlx::query("DELETE FROM inventory_movements WHERE id = $1")
            .bind(movement_id)
            .execute(&mut *tx)
            .await?;
        refresh_active_lots(&mut tx, &bins).await?;

        tx.commit().await?;

        tracing::info!(%farm_id, %movement_id, movement_type = %movement.movement_type, "movement deleted");
        Ok(())
    }

    /// Raw stock view rows for the farm
    pub async fn stock(&self, farm_id: Uuid) -> AppResult<Vec<BinLotStock>> {
        let rows = sqlx::query_as::<_, BinLotStock>(
            r#"
            SELECT bin_id, lot_id, stock_kg
            FROM v_bin_lot_stock
            WHERE farm_id = $1 AND stock_kg > 0
            ORDER BY bin_id, lot_id
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Stock view rows joined with warehouse, bin, lot and crop names
    pub async fn stock_lines(&self, farm_id: Uuid) -> AppResult<Vec<StockLine>> {
        let lines = sqlx::query_as::<_, StockLine>(
            r#"
            SELECT w.id AS warehouse_id, w.name AS warehouse_name,
                   b.id AS bin_id, b.name AS bin_name,
                   l.id AS lot_id, l.lot_code, c.name AS crop_name,
                   s.stock_kg
            FROM v_bin_lot_stock s
            JOIN bins b ON b.id = s.bin_id
            JOIN warehouses w ON w.id = b.warehouse_id
            JOIN lots l ON l.id = s.lot_id
            JOIN crops c ON c.id = l.crop_id
            WHERE s.farm_id = $1 AND s.stock_kg > 0
            ORDER BY w.name, b.name
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lines)
    }
}

/// Check and insert a movement inside an open transaction
///
/// Shared by manual movements, the atomic sale and the lot intake.
pub async fn record_in_tx(
    conn: &mut PgConnection,
    farm_id: Uuid,
    user_id: Option<Uuid>,
    movement: &NewMovement,
) -> AppResult<InventoryMovement> {
    let draft = &movement.draft;
    draft.validate_shape()?;

    let lot_known = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM lots WHERE id = $1 AND farm_id = $2)",
    )
    .bind(draft.lot_id)
    .bind(farm_id)
    .fetch_one(&mut *conn)
    .await?;
    if !lot_known {
        return Err(AppError::NotFound("Lot".to_string()));
    }

    let bins = draft.touched_bins();
    lock_bins(conn, farm_id, &bins).await?;

    let ledger = load_ledger(conn, &bins).await?;
    if let Err(violation) = ledger.check(draft) {
        tracing::warn!(
            %farm_id,
            lot_id = %draft.lot_id,
            movement_type = %draft.movement_type,
            %violation,
            "movement rejected"
        );
        return Err(violation.into());
    }

    let recorded = sqlx::query_as::<_, InventoryMovement>(&format!(
        r#"
        INSERT INTO inventory_movements (
            farm_id, movement_type, lot_id, from_bin_id, to_bin_id, weight_kg,
            movement_date, sale_id, notes, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {MOVEMENT_COLUMNS}
        "#
    ))
    .bind(farm_id)
    .bind(draft.movement_type)
    .bind(draft.lot_id)
    .bind(draft.from_bin_id)
    .bind(draft.to_bin_id)
    .bind(draft.weight_kg)
    .bind(movement.movement_date)
    .bind(movement.sale_id)
    .bind(&movement.notes)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    refresh_active_lots(conn, &bins).await?;

    tracing::info!(
        %farm_id,
        movement_id = %recorded.id,
        lot_id = %recorded.lot_id,
        movement_type = %recorded.movement_type,
        weight_kg = %recorded.weight_kg,
        "movement recorded"
    );

    Ok(recorded)
}

/// Lock bins for the rest of the transaction, in ascending id order
pub async fn lock_bins(conn: &mut PgConnection, farm_id: Uuid, bin_ids: &[Uuid]) -> AppResult<()> {
    if bin_ids.is_empty() {
        return Ok(());
    }

    let mut sorted = bin_ids.to_vec();
    sorted.sort();
    sorted.dedup();

    let locked = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM bins WHERE farm_id = $1 AND id = ANY($2) ORDER BY id FOR UPDATE",
    )
    .bind(farm_id)
    .bind(&sorted)
    .fetch_all(&mut *conn)
    .await?;

    if locked.len() != sorted.len() {
        return Err(AppError::NotFound("Bin".to_string()));
    }
    Ok(())
}

/// Current balances of every lot in the given bins
pub async fn load_ledger(conn: &mut PgConnection, bin_ids: &[Uuid]) -> AppResult<StockLedger> {
    let rows = sqlx::query_as::<_, BinLotStock>(
        "SELECT bin_id, lot_id, stock_kg FROM v_bin_lot_stock WHERE bin_id = ANY($1)",
    )
    .bind(bin_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(StockLedger::from_stock(rows)?)
}

/// Recompute `bins.active_lot_id` from the stock view
pub async fn refresh_active_lots(conn: &mut PgConnection, bin_ids: &[Uuid]) -> AppResult<()> {
    if bin_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE bins b
        SET active_lot_id = (
            SELECT s.lot_id FROM v_bin_lot_stock s
            WHERE s.bin_id = b.id AND s.stock_kg > 0
            ORDER BY s.stock_kg DESC
            LIMIT 1
        )
        WHERE b.id = ANY($1)
        "#,
    )
    .bind(bin_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
