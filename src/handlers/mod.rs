//! HTTP handlers module
//!
//! JSON endpoints grouped by resource, plus the router that wires them up.

pub mod tours;
pub mod participants;
pub mod tee_times;
pub mod payments;
pub mod documents;
pub mod messages;

use std::time::Duration;
use axum::{
    extract::State,
    http::{
        header::{HeaderValue, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use crate::config::ServerConfig;
use crate::middleware::log_requests;
use crate::state::AppState;

/// Build the API router
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        // Tours
        .route("/tours", get(tours::list_tours).post(tours::create_tour))
        .route(
            "/tours/{id}",
            get(tours::get_tour).put(tours::update_tour).delete(tours::delete_tour),
        )
        // Roster
        .route(
            "/tours/{id}/participants",
            get(participants::list_participants).post(participants::create_participant),
        )
        .route("/tours/{id}/participants/bulk-status", post(participants::bulk_status))
        .route("/tours/{id}/participants/bulk-update", post(participants::bulk_update))
        .route(
            "/participants/{id}",
            put(participants::update_participant).delete(participants::delete_participant),
        )
        .route("/tours/{id}/roster/preview", post(participants::preview_roster))
        .route("/tours/{id}/roster/import", post(participants::import_roster))
        .route("/tours/{id}/roster/export", get(participants::export_roster))
        // Tee times
        .route(
            "/tours/{id}/tee-times",
            get(tee_times::list_tee_times).post(tee_times::create_tee_time),
        )
        .route("/tee-times/{id}", delete(tee_times::delete_tee_time))
        .route("/tee-times/{id}/assign", post(tee_times::assign))
        .route("/tee-times/{id}/bulk-assign", post(tee_times::bulk_assign))
        .route("/participants/{id}/unassign", post(tee_times::unassign))
        .route("/participants/{id}/assign-itinerary", post(tee_times::assign_itinerary))
        // Payments and settlement
        .route(
            "/tours/{id}/payments",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/tours/{id}/group-payments", post(payments::record_group_payment))
        .route("/payment-batches/{batch_id}", get(payments::group_payments))
        .route("/payments/{id}/refund", post(payments::refund))
        .route("/payments/{id}/cancel", post(payments::cancel))
        .route("/participants/{id}/balance", get(payments::balance))
        .route(
            "/tours/{id}/expenses",
            get(payments::list_expenses).post(payments::add_expense),
        )
        .route("/expenses/{id}", delete(payments::delete_expense))
        .route(
            "/tours/{id}/settlement",
            get(payments::get_settlement).post(payments::recalculate_settlement),
        )
        // Document links
        .route(
            "/tours/{id}/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route("/documents/{id}/active", post(documents::set_active))
        .route("/documents/{id}", delete(documents::delete_document))
        .route("/public/documents/{slug}", get(documents::resolve_public))
        // Messaging
        .route("/messages/preview", post(messages::preview))
        .route("/messages/send", post(messages::send))
        .route("/messages/logs", get(messages::list_logs))
        .route(
            "/message-templates",
            get(messages::list_templates).post(messages::create_template),
        );

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE]),
        )
}

/// Liveness check; also proves DB connectivity
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.services().health_check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(serde_json::json!({
            "status": if status.is_healthy() { "ok" } else { "degraded" },
            "version": crate::VERSION,
            "issues": status.get_issues(),
        })),
    )
}
