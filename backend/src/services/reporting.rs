//! Season and stock reports with CSV export

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    CropHarvest, ExpenseTotal, PaymentStatus, SalesSummary, SeasonReport, StockLine,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inventory::InventoryService;

/// One row of the season summary CSV
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    pub metric: String,
    pub value: String,
}

#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Harvest, sales, expenses and remaining stock of one season
    pub async fn season_report(&self, farm_id: Uuid, season_id: Uuid) -> AppResult<SeasonReport> {
        let season_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM seasons WHERE id = $1 AND farm_id = $2",
        )
        .bind(season_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Season".to_string()))?;

        let harvest_by_crop = sqlx::query_as::<_, CropHarvest>(
            r#"
            SELECT c.id AS crop_id, c.name AS crop_name,
                   COUNT(l.id) AS lot_count,
                   COALESCE(SUM(l.harvested_kg), 0) AS harvested_kg
            FROM lots l
            JOIN crops c ON c.id = l.crop_id
            WHERE l.farm_id = $1 AND l.season_id = $2
            GROUP BY c.id, c.name
            ORDER BY c.name
            "#,
        )
        .bind(farm_id)
        .bind(season_id)
        .fetch_all(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, (Decimal, Decimal, PaymentStatus)>(
            "SELECT weight_kg, total_gel, payment_status FROM sales WHERE farm_id = $1 AND season_id = $2",
        )
        .bind(farm_id)
        .bind(season_id)
        .fetch_all(&self.db)
        .await?;

        let expenses = sqlx::query_as::<_, ExpenseTotal>(
            r#"
            SELECT allocation_type, SUM(amount_gel) AS amount_gel
            FROM expenses
            WHERE farm_id = $1 AND season_id = $2
            GROUP BY allocation_type
            ORDER BY allocation_type
            "#,
        )
        .bind(farm_id)
        .bind(season_id)
        .fetch_all(&self.db)
        .await?;

        let stock_kg = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(s.stock_kg), 0)
            FROM v_bin_lot_stock s
            JOIN lots l ON l.id = s.lot_id
            WHERE l.farm_id = $1 AND l.season_id = $2 AND s.stock_kg > 0
            "#,
        )
        .bind(farm_id)
        .bind(season_id)
        .fetch_one(&self.db)
        .await?;

        Ok(SeasonReport::assemble(
            season_id,
            season_name,
            harvest_by_crop,
            SalesSummary::from_sales(sales),
            expenses,
            stock_kg,
        ))
    }

    /// Current stock per bin and lot
    pub async fn stock_report(&self, farm_id: Uuid) -> AppResult<Vec<StockLine>> {
        InventoryService::new(self.db.clone()).stock_lines(farm_id).await
    }

    pub fn summary_rows(report: &SeasonReport) -> Vec<SummaryRow> {
        report
            .summary_rows()
            .into_iter()
            .map(|(metric, value)| SummaryRow { metric, value })
            .collect()
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
