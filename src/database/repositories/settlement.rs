//! Expense and settlement repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::settlement::{Expense, CreateExpenseRequest, Settlement, SettlementFigures};
use crate::utils::errors::TourDeskError;

#[derive(Debug, Clone)]
pub struct SettlementRepository {
    pool: PgPool,
}

impl SettlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a cost line for a tour
    pub async fn create_expense(&self, tour_id: i64, request: CreateExpenseRequest) -> Result<Expense, TourDeskError> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (tour_id, category, description, amount, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, tour_id, category, description, amount, created_at
            "#
        )
        .bind(tour_id)
        .bind(request.category.as_str())
        .bind(request.description)
        .bind(request.amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Cost lines of a tour
    pub async fn list_expenses(&self, tour_id: i64) -> Result<Vec<Expense>, TourDeskError> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT id, tour_id, category, description, amount, created_at FROM expenses WHERE tour_id = $1 ORDER BY id ASC"
        )
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Delete expense
    pub async fn delete_expense(&self, id: i64) -> Result<bool, TourDeskError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert or replace the settlement row of a tour
    pub async fn upsert(&self, tour_id: i64, figures: &SettlementFigures) -> Result<Settlement, TourDeskError> {
        let settlement = sqlx::query_as::<_, Settlement>(
            r#"
            INSERT INTO settlements (tour_id, total_revenue, total_refunded, settlement_amount, total_cost, margin, margin_rate, participant_count, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (tour_id) DO UPDATE
            SET total_revenue = EXCLUDED.total_revenue,
                total_refunded = EXCLUDED.total_refunded,
                settlement_amount = EXCLUDED.settlement_amount,
                total_cost = EXCLUDED.total_cost,
                margin = EXCLUDED.margin,
                margin_rate = EXCLUDED.margin_rate,
                participant_count = EXCLUDED.participant_count,
                updated_at = EXCLUDED.updated_at
            RETURNING tour_id, total_revenue, total_refunded, settlement_amount, total_cost, margin, margin_rate, participant_count, updated_at
            "#
        )
        .bind(tour_id)
        .bind(figures.total_revenue)
        .bind(figures.total_refunded)
        .bind(figures.settlement_amount)
        .bind(figures.total_cost)
        .bind(figures.margin)
        .bind(figures.margin_rate)
        .bind(figures.participant_count)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(settlement)
    }
}
