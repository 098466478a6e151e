//! Warehouses and their bins
//!
//! Every warehouse has exactly one default bin, created together with the
//! warehouse. Bins that appear in the movement history cannot be deleted.

use std::collections::HashMap;

use shared::{
    Bin, BinOverview, CreateBinInput, CreateWarehouseInput, Dependents, UpdateBinInput,
    UpdateWarehouseInput, Warehouse, WarehouseWithBins, DEFAULT_BIN_NAME,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

const WAREHOUSE_COLUMNS: &str = "id, farm_id, name, location, created_at, updated_at";
const BIN_COLUMNS: &str = "id, farm_id, warehouse_id, name, is_default, active_lot_id, created_at";

const BIN_OVERVIEW_SELECT: &str = r#"
    SELECT b.warehouse_id, b.id, b.name, b.is_default, b.active_lot_id,
           l.lot_code AS active_lot_code,
           COALESCE((
               SELECT SUM(s.stock_kg) FROM v_bin_lot_stock s
               WHERE s.bin_id = b.id AND s.stock_kg > 0
           ), 0) AS stock_kg
    FROM bins b
    LEFT JOIN lots l ON l.id = b.active_lot_id
"#;

#[derive(FromRow)]
struct BinOverviewRow {
    warehouse_id: Uuid,
    #[sqlx(flatten)]
    bin: BinOverview,
}

#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

impl WarehouseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All warehouses with their bins and current stock
    pub async fn list_warehouses(&self, farm_id: Uuid) -> AppResult<Vec<WarehouseWithBins>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE farm_id = $1 ORDER BY name"
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, BinOverviewRow>(&format!(
            "{BIN_OVERVIEW_SELECT} WHERE b.farm_id = $1 ORDER BY b.is_default DESC, b.name"
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        let mut bins_by_warehouse: HashMap<Uuid, Vec<BinOverview>> = HashMap::new();
        for row in rows {
            bins_by_warehouse.entry(row.warehouse_id).or_default().push(row.bin);
        }

        Ok(warehouses
            .into_iter()
            .map(|warehouse| WarehouseWithBins {
                bins: bins_by_warehouse.remove(&warehouse.id).unwrap_or_default(),
                warehouse,
            })
            .collect())
    }

    pub async fn get_warehouse(&self, farm_id: Uuid, warehouse_id: Uuid) -> AppResult<WarehouseWithBins> {
        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1 AND farm_id = $2"
        ))
        .bind(warehouse_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        let bins = self.list_bins(farm_id, Some(warehouse_id)).await?;
        Ok(WarehouseWithBins { warehouse, bins })
    }

    /// Create a warehouse and its default bin in one transaction
    pub async fn create_warehouse(&self, farm_id: Uuid, input: CreateWarehouseInput) -> AppResult<WarehouseWithBins> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            r#"
            INSERT INTO warehouses (farm_id, name, location)
            VALUES ($1, $2, $3)
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(farm_id)
        .bind(&input.name)
        .bind(&input.location)
        .fetch_one(&mut *tx)
        .await?;

        let bin_name = input.default_bin_name.as_deref().unwrap_or(DEFAULT_BIN_NAME);
        let bin = insert_bin(&mut tx, farm_id, warehouse.id, bin_name, true).await?;

        tx.commit().await?;

        tracing::info!(%farm_id, warehouse_id = %warehouse.id, default_bin_id = %bin.id, "warehouse created");

        Ok(WarehouseWithBins {
            warehouse,
            bins: vec![BinOverview {
                id: bin.id,
                name: bin.name,
                is_default: true,
                active_lot_id: None,
                active_lot_code: None,
                stock_kg: Default::default(),
            }],
        })
    }

    pub async fn update_warehouse(
        &self,
        farm_id: Uuid,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        input.validate()?;

        sqlx::query_as::<_, Warehouse>(&format!(
            r#"
            UPDATE warehouses
            SET name = COALESCE($3, name),
                location = COALESCE($4, location),
                updated_at = now()
            WHERE id = $1 AND farm_id = $2
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(warehouse_id)
        .bind(farm_id)
        .bind(&input.name)
        .bind(&input.location)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Delete a warehouse together with its bins, unless any bin has movements
    pub async fn delete_warehouse(&self, farm_id: Uuid, warehouse_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM warehouses WHERE id = $1 AND farm_id = $2 FOR UPDATE",
        )
        .bind(warehouse_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let movement_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM inventory_movements m
            JOIN bins b ON b.id = m.from_bin_id OR b.id = m.to_bin_id
            WHERE b.warehouse_id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_one(&mut *tx)
        .await?;

        Dependents::new()
            .with("movements", movement_count)
            .ensure_none()
            .map_err(|dependents| AppError::DeleteBlocked {
                resource: "warehouse".to_string(),
                dependents,
            })?;

        sqlx::query("DELETE FROM bins WHERE warehouse_id = $1")
            .bind(warehouse_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(%farm_id, %warehouse_id, "warehouse deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bins
    // ------------------------------------------------------------------

    /// Bins of the farm, or of one warehouse when `warehouse_id` is given
    pub async fn list_bins(&self, farm_id: Uuid, warehouse_id: Option<Uuid>) -> AppResult<Vec<BinOverview>> {
        let rows = sqlx::query_as::<_, BinOverviewRow>(&format!(
            "{BIN_OVERVIEW_SELECT} WHERE b.farm_id = $1 AND ($2::uuid IS NULL OR b.warehouse_id = $2) \
             ORDER BY b.warehouse_id, b.is_default DESC, b.name"
        ))
        .bind(farm_id)
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|row| row.bin).collect())
    }

    pub async fn get_bin(&self, farm_id: Uuid, bin_id: Uuid) -> AppResult<Bin> {
        sqlx::query_as::<_, Bin>(&format!(
            "SELECT {BIN_COLUMNS} FROM bins WHERE id = $1 AND farm_id = $2"
        ))
        .bind(bin_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bin".to_string()))
    }

    /// Add a bin; a new default bin takes the flag from the previous one
    pub async fn create_bin(&self, farm_id: Uuid, warehouse_id: Uuid, input: CreateBinInput) -> AppResult<Bin> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        lock_warehouse(&mut tx, farm_id, warehouse_id).await?;

        if input.is_default {
            clear_default(&mut tx, warehouse_id).await?;
        }
        let bin = insert_bin(&mut tx, farm_id, warehouse_id, &input.name, input.is_default).await?;
        tx.commit().await?;

        tracing::info!(%farm_id, %warehouse_id, bin_id = %bin.id, is_default = bin.is_default, "bin created");
        Ok(bin)
    }

    pub async fn update_bin(&self, farm_id: Uuid, bin_id: Uuid, input: UpdateBinInput) -> AppResult<Bin> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, Bin>(&format!(
            "SELECT {BIN_COLUMNS} FROM bins WHERE id = $1 AND farm_id = $2 FOR UPDATE"
        ))
        .bind(bin_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Bin".to_string()))?;

        match input.is_default {
            Some(true) if !current.is_default => {
                lock_warehouse(&mut tx, farm_id, current.warehouse_id).await?;
                clear_default(&mut tx, current.warehouse_id).await?;
            }
            Some(false) if current.is_default => {
                return Err(AppError::validation(
                    "is_default",
                    "A warehouse must keep a default bin; mark another bin as default instead",
                    "საწყობს უნდა ჰქონდეს ძირითადი სექცია; ძირითადად სხვა სექცია მონიშნეთ",
                ));
            }
            _ => {}
        }

        let bin = sqlx::query_as::<_, Bin>(&format!(
            r#"
            UPDATE bins
            SET name = COALESCE($2, name),
                is_default = is_default OR COALESCE($3, false)
            WHERE id = $1
            RETURNING {BIN_COLUMNS}
            "#
        ))
        .bind(bin_id)
        .bind(&input.name)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(bin)
    }

    /// Default bins and bins with any movement history stay
    pub async fn delete_bin(&self, farm_id: Uuid, bin_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let bin = sqlx::query_as::<_, Bin>(&format!(
            "SELECT {BIN_COLUMNS} FROM bins WHERE id = $1 AND farm_id = $2 FOR UPDATE"
        ))
        .bind(bin_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Bin".to_string()))?;

        if bin.is_default {
            return Err(AppError::Conflict {
                resource: "bin".to_string(),
                message: "The default bin of a warehouse cannot be deleted".to_string(),
                message_ka: "საწყობის ძირითადი სექციის წაშლა შეუძლებელია".to_string(),
            });
        }

        let movement_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory_movements WHERE from_bin_id = $1 OR to_bin_id = $1",
        )
        .bind(bin_id)
        .fetch_one(&mut *tx)
        .await?;

        Dependents::new()
            .with("movements", movement_count)
            .ensure_none()
            .map_err(|dependents| AppError::DeleteBlocked {
                resource: "bin".to_string(),
                dependents,
            })?;

        sqlx::query("DELETE FROM bins WHERE id = $1")
            .bind(bin_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(%farm_id, %bin_id, "bin deleted");
        Ok(())
    }
}

async fn lock_warehouse(conn: &mut PgConnection, farm_id: Uuid, warehouse_id: Uuid) -> AppResult<()> {
    let locked = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM warehouses WHERE id = $1 AND farm_id = $2 FOR UPDATE",
    )
    .bind(warehouse_id)
    .bind(farm_id)
    .fetch_optional(&mut *conn)
    .await?;

    locked
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
}

async fn clear_default(conn: &mut PgConnection, warehouse_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE bins SET is_default = false WHERE warehouse_id = $1 AND is_default")
        .bind(warehouse_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_bin(
    conn: &mut PgConnection,
    farm_id: Uuid,
    warehouse_id: Uuid,
    name: &str,
    is_default: bool,
) -> AppResult<Bin> {
    let bin = sqlx::query_as::<_, Bin>(&format!(
        r#"
        INSERT INTO bins (farm_id, warehouse_id, name, is_default)
        VALUES ($1, $2, $3, $4)
        RETURNING {BIN_COLUMNS}
        "#
    ))
    .bind(farm_id)
    .bind(warehouse_id)
    .bind(name)
    .bind(is_default)
    .fetch_one(&mut *conn)
    .await?;

    Ok(bin)
}
