//! Reporting HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

impl ReportQuery {
    fn wants_csv(&self) -> bool {
        self.format.as_deref() == Some("csv")
    }
}

fn csv_response(filename: &str, csv: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response()
}

/// Season summary: harvest, sales, expenses, margin and stock
pub async fn get_season_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(season_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let report = ReportingService::new(state.db.clone())
        .season_report(user.farm_id, season_id)
        .await?;

    if query.wants_csv() {
        let csv = ReportingService::export_to_csv(&ReportingService::summary_rows(&report))?;
        Ok(csv_response("season_report.csv", csv))
    } else {
        Ok(Json(report).into_response())
    }
}

/// Current stock per warehouse, bin and lot
pub async fn get_stock_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let lines = ReportingService::new(state.db.clone())
        .stock_report(user.farm_id)
        .await?;

    if query.wants_csv() {
        let csv = ReportingService::export_to_csv(&lines)?;
        Ok(csv_response("stock.csv", csv))
    } else {
        Ok(Json(lines).into_response())
    }
}
