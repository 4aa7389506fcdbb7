//! Tee time and assignment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::models::tee_time::{CreateTeeTimeRequest, AssignRequest, BulkAssignRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list_tee_times(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().tee_time_service.days(tour_id).await?))
}

pub async fn create_tee_time(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(mut request): Json<CreateTeeTimeRequest>,
) -> Result<impl IntoResponse> {
    request.tour_id = tour_id;
    let tee_time = state.services().tee_time_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(tee_time)))
}

pub async fn delete_tee_time(
    State(state): State<AppState>,
    Path(tee_time_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.services().tee_time_service.delete(tee_time_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign(
    State(state): State<AppState>,
    Path(tee_time_id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> Result<impl IntoResponse> {
    let participant = state.services().tee_time_service
        .assign(request.participant_id, tee_time_id)
        .await?;
    Ok(Json(participant))
}

pub async fn bulk_assign(
    State(state): State<AppState>,
    Path(tee_time_id): Path<i64>,
    Json(request): Json<BulkAssignRequest>,
) -> Result<impl IntoResponse> {
    let report = state.services().tee_time_service
        .bulk_assign(tee_time_id, &request.participant_ids)
        .await?;
    Ok(Json(report))
}

pub async fn unassign(
    State(state): State<AppState>,
    Path(participant_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().tee_time_service.unassign(participant_id).await?))
}

pub async fn assign_itinerary(
    State(state): State<AppState>,
    Path(participant_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().tee_time_service.assign_itinerary(participant_id).await?))
}
