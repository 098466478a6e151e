//! Expense HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{CreateExpenseInput, Expense, ExpenseFilter, Pagination, UpdateExpenseInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ExpenseService;
use crate::AppState;

pub async fn list_expenses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ExpenseFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Vec<Expense>>> {
    let expenses = ExpenseService::new(state.db.clone())
        .list_expenses(user.farm_id, &filter, &pagination)
        .await?;
    Ok(Json(expenses))
}

pub async fn get_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<Expense>> {
    let expense = ExpenseService::new(state.db.clone())
        .get_expense(user.farm_id, expense_id)
        .await?;
    Ok(Json(expense))
}

pub async fn create_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateExpenseInput>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let expense = ExpenseService::new(state.db.clone())
        .create_expense(user.farm_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(expense_id): Path<Uuid>,
    Json(input): Json<UpdateExpenseInput>,
) -> AppResult<Json<Expense>> {
    let expense = ExpenseService::new(state.db.clone())
        .update_expense(user.farm_id, expense_id, input)
        .await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ExpenseService::new(state.db.clone())
        .delete_expense(user.farm_id, expense_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
