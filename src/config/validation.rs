//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{TourDeskError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_gateway_config(&settings.gateway)?;
    validate_documents_config(&settings.documents)?;
    validate_messaging_config(&settings.messaging)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(TourDeskError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(TourDeskError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    if config.request_timeout_seconds == 0 {
        return Err(TourDeskError::Config(
            "Request timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(TourDeskError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(TourDeskError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(TourDeskError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate message gateway configuration
fn validate_gateway_config(config: &super::GatewayConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(TourDeskError::Config(
            "Gateway API URL is required".to_string()
        ));
    }

    url::Url::parse(&config.api_url)
        .map_err(|e| TourDeskError::Config(format!("Invalid gateway API URL: {}", e)))?;

    if config.timeout_seconds == 0 {
        return Err(TourDeskError::Config(
            "Gateway timeout must be greater than 0".to_string()
        ));
    }

    if config.requests_per_second == 0 {
        return Err(TourDeskError::Config(
            "Gateway requests per second must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate document link configuration
fn validate_documents_config(config: &super::DocumentsConfig) -> Result<()> {
    url::Url::parse(&config.public_origin)
        .map_err(|e| TourDeskError::Config(format!("Invalid public origin: {}", e)))?;

    if !(6..=32).contains(&config.slug_length) {
        return Err(TourDeskError::Config(
            format!("Slug length must be between 6 and 32, got {}", config.slug_length)
        ));
    }

    if let Some(days) = config.default_expiry_days {
        if days <= 0 {
            return Err(TourDeskError::Config(
                "Default expiry days must be positive when set".to_string()
            ));
        }
    }

    Ok(())
}

fn validate_messaging_config(config: &super::MessagingConfig) -> Result<()> {
    let costs = [config.sms_cost, config.lms_cost, config.mms_cost, config.kakao_cost];
    if costs.iter().any(|&c| c < 0) {
        return Err(TourDeskError::Config(
            "Message unit costs cannot be negative".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TourDeskError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TourDeskError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(matches!(validate_settings(&settings), Err(TourDeskError::Config(_))));
    }

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_short_slug_and_bad_origin() {
        let mut settings = Settings::default();
        settings.documents.slug_length = 3;
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.documents.public_origin = "not a url".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_zero_gateway_rate() {
        let mut settings = Settings::default();
        settings.gateway.requests_per_second = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
