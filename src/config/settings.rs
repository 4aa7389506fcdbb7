//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub documents: DocumentsConfig,
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Outbound message gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_number: String,
    pub timeout_seconds: u64,
    pub requests_per_second: u32,
}

/// Public document link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentsConfig {
    pub public_origin: String,
    pub slug_length: usize,
    pub default_expiry_days: Option<i64>,
}

/// Per-kind unit costs in won
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagingConfig {
    pub sms_cost: i64,
    pub lms_cost: i64,
    pub mms_cost: i64,
    pub kakao_cost: i64,
}

/// Roster import configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RosterConfig {
    /// Accepted pickup locations; empty accepts any value
    #[serde(default)]
    pub pickup_locations: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a specific file (extension optional) layered over defaults
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TOURDESK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .with_list_parse_key("roster.pickup_locations")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TourDeskError> {
        super::validation::validate_settings(self)
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                allowed_origins: vec!["http://localhost:3000".to_string()],
                request_timeout_seconds: 30,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/tourdesk".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            gateway: GatewayConfig {
                api_url: "http://localhost:9000/api/send".to_string(),
                api_key: String::new(),
                sender_number: "02-000-0000".to_string(),
                timeout_seconds: 10,
                requests_per_second: 5,
            },
            documents: DocumentsConfig {
                public_origin: "http://localhost:3000".to_string(),
                slug_length: 10,
                default_expiry_days: None,
            },
            messaging: MessagingConfig {
                sms_cost: 20,
                lms_cost: 50,
                mms_cost: 200,
                kakao_cost: 15,
            },
            roster: RosterConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
                json: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.documents.slug_length, 10);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::from_file("does-not-exist-tourdesk").unwrap();
        assert_eq!(settings.messaging.sms_cost, 20);
        assert!(settings.roster.pickup_locations.is_empty());
    }

    #[test]
    fn test_empty_roster_section_deserializes() {
        let defaults = config::Config::try_from(&Settings::default()).unwrap();
        let settings: Settings = config::Config::builder()
            .add_source(defaults)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.roster.pickup_locations, Vec::<String>::new());
        assert_eq!(settings.server.port, 8080);
    }
}
