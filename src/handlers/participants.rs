//! Participant roster endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use crate::models::participant::{CreateParticipantRequest, UpdateParticipantRequest, BulkStatusRequest, BulkUpdateRequest};
use crate::models::roster::RosterSheet;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list_participants(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().roster_service.list(tour_id).await?))
}

pub async fn create_participant(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(mut request): Json<CreateParticipantRequest>,
) -> Result<impl IntoResponse> {
    request.tour_id = tour_id;
    let participant = state.services().roster_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn update_participant(
    State(state): State<AppState>,
    Path(participant_id): Path<i64>,
    Json(request): Json<UpdateParticipantRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().roster_service.update(participant_id, request).await?))
}

pub async fn delete_participant(
    State(state): State<AppState>,
    Path(participant_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.services().roster_service.delete(participant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_status(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<BulkStatusRequest>,
) -> Result<impl IntoResponse> {
    let updated = state.services().roster_service
        .bulk_update_status(tour_id, &request.participant_ids, request.status)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn bulk_update(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<BulkUpdateRequest>,
) -> Result<impl IntoResponse> {
    let participants = state.services().roster_service
        .bulk_update_fields(tour_id, &request.participant_ids, request.patch)
        .await?;
    Ok(Json(participants))
}

pub async fn preview_roster(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(sheet): Json<RosterSheet>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().roster_service.preview(tour_id, &sheet.rows).await?))
}

pub async fn import_roster(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(sheet): Json<RosterSheet>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().roster_service.import(tour_id, &sheet.rows).await?))
}

pub async fn export_roster(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let rows = state.services().roster_service.export(tour_id).await?;
    Ok(Json(RosterSheet { rows }))
}
