//! Settlement service
//!
//! Keeps the per-tour expense list and recomputes the denormalized
//! settlement row from payments and expenses on every read.

use tracing::info;
use crate::database::DatabaseService;
use crate::models::payment::{Payment, PaymentStatus};
use crate::models::settlement::{Expense, CreateExpenseRequest, Settlement, SettlementFigures};
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::helpers::format_won;
use crate::utils::logging::log_tour_action;

/// Revenue, cost and margin of a tour
pub fn compute_settlement(payments: &[Payment], expenses: &[Expense], participant_count: i32) -> SettlementFigures {
    let sum_with = |status: PaymentStatus| -> i64 {
        payments.iter()
            .filter(|p| p.status() == status)
            .map(|p| p.amount)
            .sum()
    };

    let total_refunded = sum_with(PaymentStatus::Refunded);
    let total_revenue = sum_with(PaymentStatus::Completed) + total_refunded;
    let settlement_amount = total_revenue - total_refunded;
    let total_cost: i64 = expenses.iter().map(|e| e.amount).sum();
    let margin = settlement_amount - total_cost;

    SettlementFigures {
        total_revenue,
        total_refunded,
        settlement_amount,
        total_cost,
        margin,
        margin_rate: margin_rate(margin, settlement_amount),
        participant_count,
    }
}

/// Margin as a percentage of the settled amount, two decimals
pub fn margin_rate(margin: i64, settlement_amount: i64) -> f64 {
    if settlement_amount == 0 {
        return 0.0;
    }
    let rate = margin as f64 / settlement_amount as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Settlement service
#[derive(Debug, Clone)]
pub struct SettlementService {
    db: DatabaseService,
}

impl SettlementService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Add a cost line to a tour
    pub async fn add_expense(&self, tour_id: i64, request: CreateExpenseRequest) -> Result<Expense> {
        if request.amount < 0 {
            return Err(TourDeskError::InvalidInput("Expense amount cannot be negative".to_string()));
        }
        self.db.tours.find_by_id(tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id })?;

        let expense = self.db.settlements.create_expense(tour_id, request).await?;
        log_tour_action(tour_id, "expense_added", Some(&format_won(expense.amount)));
        Ok(expense)
    }

    pub async fn expenses(&self, tour_id: i64) -> Result<Vec<Expense>> {
        self.db.settlements.list_expenses(tour_id).await
    }

    pub async fn delete_expense(&self, expense_id: i64) -> Result<()> {
        if !self.db.settlements.delete_expense(expense_id).await? {
            return Err(TourDeskError::ExpenseNotFound { expense_id });
        }
        Ok(())
    }

    /// Current settlement of a tour
    ///
    /// Payments and expenses change underneath the stored row, so every read
    /// recomputes it.
    pub async fn get(&self, tour_id: i64) -> Result<Settlement> {
        self.recalculate(tour_id).await
    }

    /// Recompute the settlement from current payments and expenses
    pub async fn recalculate(&self, tour_id: i64) -> Result<Settlement> {
        self.db.tours.find_by_id(tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id })?;

        let payments = self.db.payments.list_by_tour(tour_id).await?;
        let expenses = self.db.settlements.list_expenses(tour_id).await?;
        let participant_count = self.db.participants.count_active(tour_id).await?;

        let figures = compute_settlement(&payments, &expenses, participant_count as i32);
        let settlement = self.db.settlements.upsert(tour_id, &figures).await?;

        info!(
            tour_id = tour_id,
            settlement_amount = settlement.settlement_amount,
            margin = settlement.margin,
            margin_rate = settlement.margin_rate,
            "Settlement recalculated"
        );
        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payment(amount: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: 1,
            tour_id: 1,
            participant_id: 1,
            payer_id: 1,
            amount,
            method: "card".to_string(),
            payment_type: "full".to_string(),
            status: status.as_str().to_string(),
            is_group_payment: false,
            batch_id: None,
            note: None,
            paid_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    fn expense(amount: i64) -> Expense {
        Expense {
            id: 1,
            tour_id: 1,
            category: "golf_fee".to_string(),
            description: None,
            amount,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_refund_is_excluded_from_settlement_amount() {
        let payments = vec![
            payment(500_000, PaymentStatus::Completed),
            payment(500_000, PaymentStatus::Completed),
            payment(200_000, PaymentStatus::Refunded),
            payment(100_000, PaymentStatus::Pending),
            payment(50_000, PaymentStatus::Cancelled),
        ];
        let figures = compute_settlement(&payments, &[expense(600_000), expense(100_000)], 2);

        assert_eq!(figures.total_revenue, 1_200_000);
        assert_eq!(figures.total_refunded, 200_000);
        assert_eq!(figures.settlement_amount, 1_000_000);
        assert_eq!(figures.total_cost, 700_000);
        assert_eq!(figures.margin, 300_000);
        assert_eq!(figures.margin_rate, 30.0);
        assert_eq!(figures.participant_count, 2);
    }

    #[test]
    fn test_margin_rate_rounding_and_zero() {
        assert_eq!(margin_rate(0, 0), 0.0);
        assert_eq!(margin_rate(-100, 0), 0.0);
        assert_eq!(margin_rate(1, 3), 33.33);
        assert_eq!(margin_rate(2, 3), 66.67);
        assert_eq!(margin_rate(-50, 200), -25.0);
    }

    #[test]
    fn test_empty_tour() {
        let figures = compute_settlement(&[], &[], 0);
        assert_eq!(figures.settlement_amount, 0);
        assert_eq!(figures.margin, 0);
        assert_eq!(figures.margin_rate, 0.0);
    }
}
