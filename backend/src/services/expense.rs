//! Expense service
//!
//! An expense is charged against the whole farm, a season, or one field,
//! work or lot. Targets are checked against the farm when written; deleting
//! a target later leaves the expense in place with its id.

use shared::{
    validate_expense_allocation, AllocationType, CreateExpenseInput, Expense, ExpenseFilter,
    Pagination, UpdateExpenseInput,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ensure_owned;

const EXPENSE_COLUMNS: &str = "id, farm_id, allocation_type, target_id, season_id, amount_gel, \
     expense_date, category, description, created_at";

#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

impl ExpenseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_expenses(
        &self,
        farm_id: Uuid,
        filter: &ExpenseFilter,
        pagination: &Pagination,
    ) -> AppResult<Vec<Expense>> {
        let (limit, offset) = pagination.limit_offset();

        let expenses = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE farm_id = $1
              AND ($2::uuid IS NULL OR season_id = $2)
              AND ($3::expense_allocation IS NULL OR allocation_type = $3)
              AND ($4::uuid IS NULL OR target_id = $4)
            ORDER BY expense_date DESC, created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(farm_id)
        .bind(filter.season_id)
        .bind(filter.allocation_type)
        .bind(filter.target_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(expenses)
    }

    pub async fn get_expense(&self, farm_id: Uuid, expense_id: Uuid) -> AppResult<Expense> {
        sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1 AND farm_id = $2"
        ))
        .bind(expense_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    pub async fn create_expense(&self, farm_id: Uuid, input: CreateExpenseInput) -> AppResult<Expense> {
        input.validate()?;
        validate_expense_allocation(input.allocation_type, input.target_id, input.season_id).map_err(
            |msg| AppError::validation("target_id", msg, "ხარჯის მიკუთვნება არასწორია"),
        )?;

        let mut tx = self.db.begin().await?;

        if let Some(season_id) = input.season_id {
            ensure_owned(&mut tx, "seasons", "Season", season_id, farm_id).await?;
        }
        if let Some(target_id) = input.target_id {
            let (table, label) = match input.allocation_type {
                AllocationType::Field => ("fields", "Field"),
                AllocationType::Work => ("works", "Work"),
                AllocationType::Lot => ("lots", "Lot"),
                // rejected by the allocation check above
                AllocationType::General | AllocationType::Season => {
                    return Err(AppError::validation(
                        "target_id",
                        "GENERAL and SEASON expenses cannot have a target",
                        "ხარჯის მიკუთვნება არასწორია",
                    ))
                }
            };
            ensure_owned(&mut tx, table, label, target_id, farm_id).await?;
        }

        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            INSERT INTO expenses (
                farm_id, allocation_type, target_id, season_id, amount_gel,
                expense_date, category, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(farm_id)
        .bind(input.allocation_type)
        .bind(input.target_id)
        .bind(input.season_id)
        .bind(input.amount_gel)
        .bind(input.expense_date)
        .bind(&input.category)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            %farm_id,
            expense_id = %expense.id,
            allocation = expense.allocation_type.as_str(),
            amount_gel = %expense.amount_gel,
            "expense recorded"
        );
        Ok(expense)
    }

    /// Allocation is fixed once written; only amounts and texts change
    pub async fn update_expense(
        &self,
        farm_id: Uuid,
        expense_id: Uuid,
        input: UpdateExpenseInput,
    ) -> AppResult<Expense> {
        input.validate()?;

        sqlx::query_as::<_, Expense>(&format!(
            r#"
            UPDATE expenses
            SET amount_gel = COALESCE($3, amount_gel),
                expense_date = COALESCE($4, expense_date),
                category = COALESCE($5, category),
                description = COALESCE($6, description)
            WHERE id = $1 AND farm_id = $2
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(expense_id)
        .bind(farm_id)
        .bind(input.amount_gel)
        .bind(input.expense_date)
        .bind(&input.category)
        .bind(&input.description)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    pub async fn delete_expense(&self, farm_id: Uuid, expense_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND farm_id = $2")
            .bind(expense_id)
            .bind(farm_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }
        Ok(())
    }
}
