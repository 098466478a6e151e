//! Warehouse and bin models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A physical storage building
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Warehouse {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A storage subdivision of a warehouse; holds at most one lot at a time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bin {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub warehouse_id: Uuid,
    pub name: String,
    pub is_default: bool,
    /// Lot currently holding positive stock in this bin, maintained on every movement
    pub active_lot_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Bin with its current stock, as shown on the warehouse page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BinOverview {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub active_lot_id: Option<Uuid>,
    pub active_lot_code: Option<String>,
    pub stock_kg: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseWithBins {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub bins: Vec<BinOverview>,
}

impl WarehouseWithBins {
    pub fn total_stock_kg(&self) -> Decimal {
        self.bins.iter().map(|b| b.stock_kg).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWarehouseInput {
    #[validate(length(min = 1, max = 120, message = "Warehouse name must be 1-120 characters"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    /// Name of the default bin created with the warehouse
    #[validate(length(min = 1, max = 60))]
    pub default_bin_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWarehouseInput {
    #[validate(length(min = 1, max = 120, message = "Warehouse name must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBinInput {
    #[validate(length(min = 1, max = 60, message = "Bin name must be 1-60 characters"))]
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBinInput {
    #[validate(length(min = 1, max = 60, message = "Bin name must be 1-60 characters"))]
    pub name: Option<String>,
    /// Only `true` is meaningful: it moves the default flag to this bin
    pub is_default: Option<bool>,
}

/// Default bin name used when a warehouse is created without one
pub const DEFAULT_BIN_NAME: &str = "მთავარი";
