//! Payment model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::errors::TourDeskError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub tour_id: i64,
    pub participant_id: i64,
    pub payer_id: i64,
    pub amount: i64,
    pub method: String,
    pub payment_type: String,
    pub status: String,
    pub is_group_payment: bool,
    pub batch_id: Option<Uuid>,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn status(&self) -> PaymentStatus {
        self.status.parse().unwrap_or(PaymentStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub participant_id: i64,
    /// Defaults to the participant themself
    pub payer_id: Option<i64>,
    pub amount: i64,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    pub status: Option<PaymentStatus>,
    pub note: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Fully resolved row ready for insertion
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub tour_id: i64,
    pub participant_id: i64,
    pub payer_id: i64,
    pub amount: i64,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub is_group_payment: bool,
    pub batch_id: Option<Uuid>,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPaymentMode {
    /// Divide the amount evenly across the participants
    Split,
    /// Charge the full amount to every participant
    Each,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPaymentRequest {
    pub payer_id: i64,
    pub participant_ids: Vec<i64>,
    pub amount: i64,
    pub mode: GroupPaymentMode,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPaymentReceipt {
    pub batch_id: Uuid,
    pub payments: Vec<Payment>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub reason: Option<String>,
}

/// Where a participant stands against the tour price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant_id: i64,
    pub price: i64,
    pub paid: i64,
    pub remaining: i64,
    pub fully_paid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Counts toward the tour price
    pub fn is_counted(&self) -> bool {
        !matches!(self, PaymentStatus::Cancelled | PaymentStatus::Refunded)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = TourDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(PaymentStatus::Completed),
            "pending" => Ok(PaymentStatus::Pending),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(TourDeskError::InvalidInput(format!("Unknown payment status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Deposit,
    Balance,
    Full,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Deposit => "deposit",
            PaymentType::Balance => "balance",
            PaymentType::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_statuses() {
        assert!(PaymentStatus::Completed.is_counted());
        assert!(PaymentStatus::Pending.is_counted());
        assert!(!PaymentStatus::Cancelled.is_counted());
        assert!(!PaymentStatus::Refunded.is_counted());
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [PaymentStatus::Completed, PaymentStatus::Pending, PaymentStatus::Cancelled, PaymentStatus::Refunded] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }
}
