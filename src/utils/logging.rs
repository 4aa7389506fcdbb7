//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the TourDesk application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{TourDeskError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "tourdesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(stdout_layer)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| TourDeskError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log tour management actions
pub fn log_tour_action(tour_id: i64, action: &str, details: Option<&str>) {
    info!(
        tour_id = tour_id,
        action = action,
        details = details,
        "Tour action performed"
    );
}

/// Log tee-time assignment outcomes
pub fn log_assignment(tee_time_id: i64, participant_id: i64, accepted: bool, reason: Option<&str>) {
    if accepted {
        info!(
            tee_time_id = tee_time_id,
            participant_id = participant_id,
            "Participant assigned to tee time"
        );
    } else {
        warn!(
            tee_time_id = tee_time_id,
            participant_id = participant_id,
            reason = reason,
            "Tee time assignment rejected"
        );
    }
}

/// Log payment bookkeeping
pub fn log_payment(participant_id: i64, action: &str, amount: i64, details: Option<&str>) {
    info!(
        participant_id = participant_id,
        action = action,
        amount = amount,
        details = details,
        "Payment action performed"
    );
}

/// Log message gateway calls
pub fn log_gateway_call(kind: &str, recipients: usize, sent: u32, failed: u32) {
    if failed > 0 {
        warn!(
            kind = kind,
            recipients = recipients,
            sent = sent,
            failed = failed,
            "Gateway reported failed deliveries"
        );
    } else {
        info!(
            kind = kind,
            recipients = recipients,
            sent = sent,
            "Gateway call completed"
        );
    }
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
