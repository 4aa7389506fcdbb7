//! Expense and settlement models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub tour_id: i64,
    pub category: String,
    pub description: Option<String>,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub category: ExpenseCategory,
    pub description: Option<String>,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    GolfFee,
    Accommodation,
    Transportation,
    Meals,
    Guide,
    Insurance,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::GolfFee => "golf_fee",
            ExpenseCategory::Accommodation => "accommodation",
            ExpenseCategory::Transportation => "transportation",
            ExpenseCategory::Meals => "meals",
            ExpenseCategory::Guide => "guide",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::Other => "other",
        }
    }
}

/// Denormalized per-tour settlement row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settlement {
    pub tour_id: i64,
    pub total_revenue: i64,
    pub total_refunded: i64,
    pub settlement_amount: i64,
    pub total_cost: i64,
    pub margin: i64,
    pub margin_rate: f64,
    pub participant_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Settlement arithmetic before it is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementFigures {
    pub total_revenue: i64,
    pub total_refunded: i64,
    pub settlement_amount: i64,
    pub total_cost: i64,
    pub margin: i64,
    pub margin_rate: f64,
    pub participant_count: i32,
}
