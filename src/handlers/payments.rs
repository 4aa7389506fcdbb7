//! Payment, expense and settlement endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use crate::models::payment::{CreatePaymentRequest, GroupPaymentRequest, RefundRequest};
use crate::models::settlement::CreateExpenseRequest;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list_payments(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().payment_service.list(tour_id).await?))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse> {
    let payment = state.services().payment_service.record_payment(tour_id, request).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn record_group_payment(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<GroupPaymentRequest>,
) -> Result<impl IntoResponse> {
    let receipt = state.services().payment_service.record_group_payment(tour_id, request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn group_payments(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().payment_service.group_payments(batch_id).await?))
}

pub async fn refund(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
    Json(request): Json<RefundRequest>,
) -> Result<impl IntoResponse> {
    let payment = state.services().payment_service
        .refund(payment_id, request.reason.as_deref())
        .await?;
    Ok(Json(payment))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().payment_service.cancel(payment_id).await?))
}

pub async fn balance(
    State(state): State<AppState>,
    Path(participant_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().payment_service.balance(participant_id).await?))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().settlement_service.expenses(tour_id).await?))
}

pub async fn add_expense(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse> {
    let expense = state.services().settlement_service.add_expense(tour_id, request).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.services().settlement_service.delete_expense(expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settlement(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().settlement_service.get(tour_id).await?))
}

pub async fn recalculate_settlement(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.services().settlement_service.recalculate(tour_id).await?))
}
