//! Services module
//!
//! This module contains business logic services

pub mod tour;
pub mod roster;
pub mod tee_time;
pub mod payment;
pub mod settlement;
pub mod document;
pub mod gateway;
pub mod messaging;

// Re-export commonly used services
pub use tour::TourService;
pub use roster::{RosterService, ROSTER_HEADERS};
pub use tee_time::TeeTimeService;
pub use payment::PaymentService;
pub use settlement::SettlementService;
pub use document::DocumentService;
pub use gateway::{GatewayClient, GatewayRequest, GatewayResponse};
pub use messaging::MessagingService;

use serde::Serialize;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub tour_service: TourService,
    pub roster_service: RosterService,
    pub tee_time_service: TeeTimeService,
    pub payment_service: PaymentService,
    pub settlement_service: SettlementService,
    pub document_service: DocumentService,
    pub messaging_service: MessagingService,
    db: DatabaseService,
    gateway_configured: bool,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, db: DatabaseService) -> Result<Self> {
        let gateway = GatewayClient::new(settings.gateway.clone())?;

        Ok(Self {
            tour_service: TourService::new(db.clone()),
            roster_service: RosterService::new(db.clone(), settings.roster.clone()),
            tee_time_service: TeeTimeService::new(db.clone()),
            payment_service: PaymentService::new(db.clone()),
            settlement_service: SettlementService::new(db.clone()),
            document_service: DocumentService::new(db.clone(), settings.documents.clone()),
            messaging_service: MessagingService::new(db.clone(), gateway, settings.messaging.clone()),
            db,
            gateway_configured: !settings.gateway.api_key.is_empty(),
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = self.db.health_check().await.is_ok();

        ServiceHealthStatus {
            database_healthy,
            gateway_configured: self.gateway_configured,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub gateway_configured: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.gateway_configured {
            issues.push("Message gateway API key not set".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_issues() {
        let status = ServiceHealthStatus { database_healthy: false, gateway_configured: true };
        assert!(!status.is_healthy());
        assert_eq!(status.get_issues(), vec!["Database connection failed".to_string()]);

        let status = ServiceHealthStatus { database_healthy: true, gateway_configured: false };
        assert!(status.is_healthy());
        assert_eq!(status.get_issues().len(), 1);

        let status = ServiceHealthStatus { database_healthy: true, gateway_configured: true };
        assert!(status.is_healthy());
        assert!(status.get_issues().is_empty());
    }
}
