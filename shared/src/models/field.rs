//! Field models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A cultivated field of the farm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Field {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub area_ha: Option<Decimal>,
    pub location: Option<String>,
    pub crop_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFieldInput {
    #[validate(length(min = 1, max = 120, message = "Field name must be 1-120 characters"))]
    pub name: String,
    #[validate(custom = "crate::validation::validate_positive_decimal")]
    pub area_ha: Option<Decimal>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub crop_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFieldInput {
    #[validate(length(min = 1, max = 120, message = "Field name must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(custom = "crate::validation::validate_positive_decimal")]
    pub area_ha: Option<Decimal>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub crop_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Field together with the counts that decide whether it may be deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldWithUsage {
    #[serde(flatten)]
    pub field: Field,
    pub lot_count: i64,
    pub work_count: i64,
}

impl FieldWithUsage {
    pub fn can_delete(&self) -> bool {
        self.lot_count == 0 && self.work_count == 0
    }
}
