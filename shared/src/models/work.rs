//! Field work (operations performed on a field)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Work {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub field_id: Uuid,
    pub work_type_id: Uuid,
    pub season_id: Option<Uuid>,
    pub work_date: NaiveDate,
    pub cost_gel: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkInput {
    pub field_id: Uuid,
    pub work_type_id: Uuid,
    pub season_id: Option<Uuid>,
    pub work_date: NaiveDate,
    #[validate(custom = "crate::validation::validate_non_negative_decimal")]
    pub cost_gel: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWorkInput {
    pub work_type_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub work_date: Option<NaiveDate>,
    #[validate(custom = "crate::validation::validate_non_negative_decimal")]
    pub cost_gel: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query filter for listing works
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkFilter {
    pub field_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
}
