//! Inventory ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Kind of ledger event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "movement_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Receive,
    Transfer,
    SaleOut,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Receive => "RECEIVE",
            MovementType::Transfer => "TRANSFER",
            MovementType::SaleOut => "SALE_OUT",
            MovementType::Adjustment => "ADJUSTMENT",
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded movement of a lot's weight between bins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryMovement {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub movement_type: MovementType,
    pub lot_id: Uuid,
    pub from_bin_id: Option<Uuid>,
    pub to_bin_id: Option<Uuid>,
    pub weight_kg: Decimal,
    pub movement_date: NaiveDate,
    pub sale_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordMovementInput {
    pub movement_type: MovementType,
    pub lot_id: Uuid,
    pub from_bin_id: Option<Uuid>,
    pub to_bin_id: Option<Uuid>,
    #[validate(custom = "crate::validation::validate_weight_kg")]
    pub weight_kg: Decimal,
    pub movement_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query filter for listing movements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub lot_id: Option<Uuid>,
    pub bin_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
}

/// One row of the stock view: current balance of a lot in a bin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BinLotStock {
    pub bin_id: Uuid,
    pub lot_id: Uuid,
    pub stock_kg: Decimal,
}

/// Stock view row joined with human-readable labels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLine {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub bin_id: Uuid,
    pub bin_name: String,
    pub lot_id: Uuid,
    pub lot_code: String,
    pub crop_name: String,
    pub stock_kg: Decimal,
}
