//! Tour endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use crate::models::tour::{CreateTourRequest, UpdateTourRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn create_tour(
    State(state): State<AppState>,
    Json(request): Json<CreateTourRequest>,
) -> Result<impl IntoResponse> {
    let tour = state.services().tour_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(tour)))
}

pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let tours = state.services().tour_service.list(query.limit, query.offset).await?;
    Ok(Json(tours))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().tour_service.get(tour_id).await?))
}

pub async fn update_tour(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<UpdateTourRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().tour_service.update(tour_id, request).await?))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.services().tour_service.delete(tour_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
