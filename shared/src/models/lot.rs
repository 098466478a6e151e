//! Lot models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{BinLotStock, InventoryMovement};

/// One harvested batch of a crop/variety from a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Lot {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub season_id: Uuid,
    pub lot_code: String,
    pub crop_id: Uuid,
    pub variety_id: Option<Uuid>,
    pub field_id: Uuid,
    /// Fixed at creation; later quantities live in the movement ledger
    pub harvested_kg: Decimal,
    pub harvest_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLotInput {
    pub season_id: Uuid,
    #[validate(custom = "crate::validation::validate_lot_code")]
    pub lot_code: String,
    pub crop_id: Uuid,
    pub variety_id: Option<Uuid>,
    pub field_id: Uuid,
    #[validate(custom = "crate::validation::validate_weight_kg")]
    pub harvested_kg: Decimal,
    pub harvest_date: NaiveDate,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Editable lot attributes; `harvested_kg` stays as recorded at creation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateLotInput {
    #[validate(custom = "crate::validation::validate_lot_code")]
    pub lot_code: Option<String>,
    pub variety_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Warehouse receipt step of lot creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReceiptInput {
    pub bin_id: Uuid,
    /// Defaults to the lot's harvested weight
    #[validate(custom = "crate::validation::validate_weight_kg")]
    pub weight_kg: Option<Decimal>,
    /// Defaults to the harvest date
    pub movement_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Both steps of the lot creation wizard
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LotIntakeInput {
    #[validate]
    pub lot: CreateLotInput,
    #[validate]
    pub receipt: ReceiptInput,
}

/// Query filter for listing lots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotFilter {
    pub season_id: Option<Uuid>,
    pub field_id: Option<Uuid>,
    pub crop_id: Option<Uuid>,
}

/// Lot with where it is stored and how much of it was sold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotDetail {
    #[serde(flatten)]
    pub lot: Lot,
    pub stock: Vec<BinLotStock>,
    pub stock_kg: Decimal,
    pub sold_kg: Decimal,
    pub sale_count: i64,
    pub movements: Vec<InventoryMovement>,
}

impl LotDetail {
    pub fn can_delete(&self) -> bool {
        self.sale_count == 0
    }
}
