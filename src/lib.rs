//! TourDesk
//!
//! Back office for golf tour operators. This library provides modular
//! components for tee-time assignment, participant rosters, payments and
//! settlement, shareable document links, and SMS/Kakao messaging.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TourDeskError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use state::AppState;
pub use handlers::build_router;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
