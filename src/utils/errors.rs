//! Error handling for TourDesk
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Main error type for TourDesk application
#[derive(Error, Debug)]
pub enum TourDeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Message gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tour not found: {tour_id}")]
    TourNotFound { tour_id: i64 },

    #[error("Participant not found: {participant_id}")]
    ParticipantNotFound { participant_id: i64 },

    #[error("Tee time not found: {tee_time_id}")]
    TeeTimeNotFound { tee_time_id: i64 },

    #[error("Payment not found: {payment_id}")]
    PaymentNotFound { payment_id: i64 },

    #[error("Expense not found: {expense_id}")]
    ExpenseNotFound { expense_id: i64 },

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Message template not found: {template_id}")]
    TemplateNotFound { template_id: i64 },

    #[error("Tee time {tee_time_id} is full ({max_players} players)")]
    CapacityExceeded { tee_time_id: i64, max_players: i32 },

    #[error("Payment exceeds tour price: price {price}, already paid {already_paid}, attempted {attempted}")]
    PriceExceeded { price: i64, already_paid: i64, attempted: i64 },

    #[error("Participant {participant_id} has {payments} payment(s) on record")]
    ParticipantHasPayments { participant_id: i64, payments: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Document link has expired")]
    DocumentExpired,

    #[error("Document link is inactive")]
    DocumentInactive,

    #[error("Message too long: {bytes} bytes (limit {limit})")]
    MessageTooLong { bytes: usize, limit: usize },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Message gateway specific errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),

    #[error("Gateway timeout")]
    Timeout,

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Gateway service unavailable")]
    ServiceUnavailable,
}

impl From<config::ConfigError> for TourDeskError {
    fn from(e: config::ConfigError) -> Self {
        TourDeskError::Config(e.to_string())
    }
}

/// Result type alias for TourDesk operations
pub type Result<T> = std::result::Result<T, TourDeskError>;

impl TourDeskError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TourDeskError::Database(_) => false,
            TourDeskError::Migration(_) => false,
            TourDeskError::Gateway(_) => true,
            TourDeskError::Config(_) => false,
            TourDeskError::TourNotFound { .. } => false,
            TourDeskError::ParticipantNotFound { .. } => false,
            TourDeskError::TeeTimeNotFound { .. } => false,
            TourDeskError::PaymentNotFound { .. } => false,
            TourDeskError::ExpenseNotFound { .. } => false,
            TourDeskError::DocumentNotFound(_) => false,
            TourDeskError::TemplateNotFound { .. } => false,
            TourDeskError::CapacityExceeded { .. } => false,
            TourDeskError::PriceExceeded { .. } => false,
            TourDeskError::ParticipantHasPayments { .. } => false,
            TourDeskError::InvalidStateTransition { .. } => false,
            TourDeskError::DocumentExpired => false,
            TourDeskError::DocumentInactive => false,
            TourDeskError::MessageTooLong { .. } => false,
            TourDeskError::Http(_) => true,
            TourDeskError::Serialization(_) => false,
            TourDeskError::Io(_) => true,
            TourDeskError::UrlParse(_) => false,
            TourDeskError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TourDeskError::Database(_) => ErrorSeverity::Critical,
            TourDeskError::Migration(_) => ErrorSeverity::Critical,
            TourDeskError::Config(_) => ErrorSeverity::Critical,
            TourDeskError::CapacityExceeded { .. } => ErrorSeverity::Warning,
            TourDeskError::PriceExceeded { .. } => ErrorSeverity::Warning,
            TourDeskError::ParticipantHasPayments { .. } => ErrorSeverity::Warning,
            TourDeskError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            TourDeskError::DocumentExpired => ErrorSeverity::Info,
            TourDeskError::DocumentInactive => ErrorSeverity::Info,
            TourDeskError::MessageTooLong { .. } => ErrorSeverity::Info,
            TourDeskError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status code reported to API clients
    pub fn http_status(&self) -> StatusCode {
        match self {
            TourDeskError::TourNotFound { .. }
            | TourDeskError::ParticipantNotFound { .. }
            | TourDeskError::TeeTimeNotFound { .. }
            | TourDeskError::PaymentNotFound { .. }
            | TourDeskError::ExpenseNotFound { .. }
            | TourDeskError::DocumentNotFound(_)
            | TourDeskError::TemplateNotFound { .. } => StatusCode::NOT_FOUND,
            TourDeskError::CapacityExceeded { .. }
            | TourDeskError::PriceExceeded { .. }
            | TourDeskError::ParticipantHasPayments { .. }
            | TourDeskError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            TourDeskError::DocumentExpired | TourDeskError::DocumentInactive => StatusCode::GONE,
            TourDeskError::MessageTooLong { .. } | TourDeskError::InvalidInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TourDeskError::Gateway(_) | TourDeskError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TourDeskError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let message = match &self {
            TourDeskError::Database(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                "Internal database error".to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, severity = %self.severity(), error = %message, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %message, "Request rejected");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        let full = TourDeskError::CapacityExceeded { tee_time_id: 3, max_players: 4 };
        assert_eq!(full.http_status(), StatusCode::CONFLICT);
        assert_eq!(full.severity(), ErrorSeverity::Warning);
        assert!(!full.is_recoverable());

        let missing = TourDeskError::TourNotFound { tour_id: 1 };
        assert_eq!(missing.http_status(), StatusCode::NOT_FOUND);

        assert_eq!(TourDeskError::DocumentExpired.http_status(), StatusCode::GONE);
    }

    #[test]
    fn test_gateway_errors_are_recoverable() {
        let err = TourDeskError::from(GatewayError::Timeout);
        assert!(err.is_recoverable());
        assert_eq!(err.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Message gateway error: Gateway timeout");
    }

    #[test]
    fn test_price_exceeded_message() {
        let err = TourDeskError::PriceExceeded { price: 500_000, already_paid: 450_000, attempted: 100_000 };
        assert!(err.to_string().contains("already paid 450000"));
    }

    #[test]
    fn test_participant_with_payments_is_a_conflict() {
        let err = TourDeskError::ParticipantHasPayments { participant_id: 7, payments: 2 };
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Participant 7 has 2 payment(s) on record");
    }
}
