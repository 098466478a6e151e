//! Expense models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// What an expense is charged against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "expense_allocation", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationType {
    General,
    Season,
    Field,
    Work,
    Lot,
}

impl AllocationType {
    pub const ALL: [AllocationType; 5] = [
        AllocationType::General,
        AllocationType::Season,
        AllocationType::Field,
        AllocationType::Work,
        AllocationType::Lot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationType::General => "GENERAL",
            AllocationType::Season => "SEASON",
            AllocationType::Field => "FIELD",
            AllocationType::Work => "WORK",
            AllocationType::Lot => "LOT",
        }
    }

    /// Whether the allocation points at a concrete record via `target_id`
    pub fn requires_target(&self) -> bool {
        !matches!(self, AllocationType::General | AllocationType::Season)
    }
}

impl std::str::FromStr for AllocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AllocationType::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown allocation type: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub allocation_type: AllocationType,
    pub target_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub amount_gel: Decimal,
    pub expense_date: NaiveDate,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExpenseInput {
    pub allocation_type: AllocationType,
    pub target_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    #[validate(custom = "crate::validation::validate_gel_amount")]
    pub amount_gel: Decimal,
    pub expense_date: NaiveDate,
    #[validate(length(max = 80))]
    pub category: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateExpenseInput {
    #[validate(custom = "crate::validation::validate_gel_amount")]
    pub amount_gel: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    #[validate(length(max = 80))]
    pub category: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Query filter for listing expenses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub season_id: Option<Uuid>,
    pub allocation_type: Option<AllocationType>,
    pub target_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_types_parse_from_their_wire_names() {
        for allocation in AllocationType::ALL {
            assert_eq!(allocation.as_str().parse::<AllocationType>(), Ok(allocation));
        }
        assert_eq!(
            "lot".parse::<AllocationType>(),
            Err("unknown allocation type: lot".to_string())
        );
    }
}
