//! Document link endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::models::document::{CreateDocumentLinkRequest, SetActiveRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list_documents(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().document_service.list(tour_id).await?))
}

pub async fn create_document(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<CreateDocumentLinkRequest>,
) -> Result<impl IntoResponse> {
    let link = state.services().document_service.create(tour_id, request).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn set_active(
    State(state): State<AppState>,
    Path(link_id): Path<i64>,
    Json(request): Json<SetActiveRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().document_service.set_active(link_id, request.is_active).await?))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(link_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.services().document_service.delete(link_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public slug lookup used by the shared pages
pub async fn resolve_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().document_service.resolve(&slug).await?))
}
