//! Shared application state
//!
//! Handed to every axum handler; cheap to clone.

use std::sync::Arc;
use crate::config::Settings;
use crate::services::ServiceFactory;

#[derive(Debug, Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(services: ServiceFactory, settings: Settings) -> Self {
        Self {
            services: Arc::new(services),
            settings: Arc::new(settings),
        }
    }

    pub fn services(&self) -> &ServiceFactory {
        &self.services
    }
}
