//! Reference data: seasons, crops, varieties and work types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Field, Warehouse};

/// An agricultural season (usually one calendar year of work)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Season {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Crop {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Variety {
    pub id: Uuid,
    pub crop_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WorkType {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Everything a data-entry form needs for its dropdowns, fetched in one go
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterData {
    pub seasons: Vec<Season>,
    pub crops: Vec<Crop>,
    pub fields: Vec<Field>,
    pub warehouses: Vec<Warehouse>,
    pub work_types: Vec<WorkType>,
}

impl MasterData {
    /// The season currently flagged active, falling back to the latest one
    pub fn current_season(&self) -> Option<&Season> {
        self.seasons
            .iter()
            .find(|s| s.is_active)
            .or_else(|| self.seasons.iter().max_by_key(|s| s.start_date))
    }
}
