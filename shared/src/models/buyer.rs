//! Buyer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Buyer {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBuyerInput {
    #[validate(length(min = 1, max = 160, message = "Buyer name must be 1-160 characters"))]
    pub name: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(custom = "crate::validation::validate_tax_id")]
    pub tax_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBuyerInput {
    #[validate(length(min = 1, max = 160, message = "Buyer name must be 1-160 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(custom = "crate::validation::validate_tax_id")]
    pub tax_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
