use agencydb_core::{
    record_payment as record, toggle_payment_verified, CurrentUser, NewPayment, PaymentFilter,
    PaymentRecord, PaymentStats, YearMonth,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_crm_error, require_admin, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PaymentStatsQuery {
    pub month: YearMonth,
}

pub(super) async fn list_payments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<PaymentFilter>,
) -> Result<Json<ApiResponse<Vec<PaymentRecord>>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let payments = state
        .store
        .find_payments(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, payments)))
}

pub(super) async fn record_payment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<NewPayment>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentRecord>>), ApiError> {
    require_admin(&req_id.0, &user)?;
    let payment = record(state.store.as_ref(), body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    tracing::info!(payment_id = %payment.id, creator_id = %payment.creator_id, month = %payment.month, "payment recorded");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, payment)),
    ))
}

/// POST /api/v1/payments/{id}/verify flips the flag; calling it twice restores it.
pub(super) async fn toggle_verified(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentRecord>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let payment = toggle_payment_verified(state.store.as_ref(), id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, payment)))
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PaymentStatsQuery>,
) -> Result<Json<ApiResponse<PaymentStats>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let filter = PaymentFilter {
        month: Some(query.month),
        ..PaymentFilter::default()
    };
    let payments = state
        .store
        .find_payments(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        PaymentStats::for_month(query.month, &payments),
    )))
}
