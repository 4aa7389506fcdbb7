//! TourDesk back office API
//!
//! Main application entry point

use tracing::{info, error};

use TourDesk::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, connection::{DatabaseConfig, create_pool, run_migrations}},
    services::ServiceFactory,
    state::AppState,
    handlers::build_router,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", TourDesk::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;

    let database_service = DatabaseService::new(db_pool);

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(&settings, database_service)?;

    let health = services.health_check().await;
    for issue in health.get_issues() {
        error!(issue = %issue, "Service health issue at startup");
    }

    let state = AppState::new(services, settings.clone());
    let app = build_router(state, &settings.server);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "TourDesk API is ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("TourDesk stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
