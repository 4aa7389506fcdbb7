//! Messaging endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use crate::models::message::{PreviewRequest, SendMessageRequest, CreateTemplateRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub tour_id: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().messaging_service.preview(&request)?))
}

pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().messaging_service.send(request).await?))
}

pub async fn list_templates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.services().messaging_service.templates().await?))
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse> {
    let template = state.services().messaging_service.create_template(request).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().messaging_service.logs(query.tour_id, query.limit).await?))
}
