//! Sale models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Partial => "PARTIAL",
            PaymentStatus::Paid => "PAID",
        }
    }
}

/// A commercial disposition of stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub season_id: Uuid,
    pub lot_id: Uuid,
    pub bin_id: Uuid,
    pub buyer_id: Uuid,
    pub sale_date: NaiveDate,
    pub weight_kg: Decimal,
    pub price_per_kg: Decimal,
    /// weight_kg × price_per_kg rounded to tetri
    pub total_gel: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters of the atomic sale operation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSaleInput {
    /// Optional echo of the caller's farm; rejected when it names another farm
    pub farm_id: Option<Uuid>,
    pub season_id: Uuid,
    pub lot_id: Uuid,
    pub bin_id: Uuid,
    pub buyer_id: Uuid,
    pub sale_date: NaiveDate,
    #[validate(custom = "crate::validation::validate_weight_kg")]
    pub weight_kg: Decimal,
    #[validate(custom = "crate::validation::validate_price_per_kg")]
    pub price_per_kg: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSaleInput {
    pub payment_status: Option<PaymentStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query filter for listing sales
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleFilter {
    pub season_id: Option<Uuid>,
    pub lot_id: Option<Uuid>,
    pub buyer_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
}
