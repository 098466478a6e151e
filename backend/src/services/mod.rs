//! Business logic services for the Farm Ledger Platform

pub mod buyer;
pub mod catalog;
pub mod expense;
pub mod field;
pub mod inventory;
pub mod lot;
pub mod master_data;
pub mod profile;
pub mod reporting;
pub mod sale;
pub mod warehouse;
pub mod work;

pub use buyer::BuyerService;
pub use catalog::CatalogService;
pub use expense::ExpenseService;
pub use field::FieldService;
pub use inventory::InventoryService;
pub use lot::LotService;
pub use master_data::{MasterDataCache, MasterDataService};
pub use profile::ProfileService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use warehouse::WarehouseService;
pub use work::WorkService;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Fail with NotFound unless `table` has a row `id` belonging to the farm
///
/// `table` is always a literal from this crate, never user input.
pub async fn ensure_owned(
    conn: &mut PgConnection,
    table: &'static str,
    label: &str,
    id: Uuid,
    farm_id: Uuid,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1 AND farm_id = $2)"
    ))
    .bind(id)
    .bind(farm_id)
    .fetch_one(&mut *conn)
    .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(label.to_string()))
    }
}
