//! Admin-only revenue ledger handlers.

use agencydb_core::{
    find_discrepancies, record_manual_revenue, top_creators, CreatorTotal, CurrentUser,
    Discrepancy, MonthTotal, MonthlyTotals, NewRevenueEntry, RevenueEntry, RevenueFilter,
    YearMonth,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_crm_error, normalize_limit, require_admin, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct MonthlyTotalsQuery {
    pub months: Option<usize>,
    pub until: Option<YearMonth>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopCreatorsQuery {
    pub month: Option<YearMonth>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct MonthlyTotalsItem {
    pub months: Vec<MonthTotal>,
    pub current_month: YearMonth,
    pub previous_month: YearMonth,
}

async fn load_entries(
    state: &AppState,
    request_id: &str,
    filter: &RevenueFilter,
) -> Result<Vec<RevenueEntry>, ApiError> {
    state
        .store
        .find_revenue(filter)
        .await
        .map_err(|e| map_crm_error(request_id.to_string(), &e))
}

pub(super) async fn list_revenue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<RevenueFilter>,
) -> Result<Json<ApiResponse<Vec<RevenueEntry>>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let entries = load_entries(&state, &req_id.0, &filter).await?;

    Ok(Json(ApiResponse::new(req_id.0, entries)))
}

/// PUT /api/v1/revenue: one manual row per creator and month.
pub(super) async fn upsert_manual_revenue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<NewRevenueEntry>,
) -> Result<Json<ApiResponse<RevenueEntry>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let entry = record_manual_revenue(state.store.as_ref(), body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, entry)))
}

pub(super) async fn delete_revenue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&req_id.0, &user)?;
    agencydb_core::delete_revenue(state.store.as_ref(), id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_discrepancies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Discrepancy>>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let found = find_discrepancies(state.store.as_ref())
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    if !found.is_empty() {
        tracing::warn!(count = found.len(), "revenue discrepancies present");
    }

    Ok(Json(ApiResponse::new(req_id.0, found)))
}

/// GET /api/v1/revenue/monthly-totals?months=6&until=2024-06
pub(super) async fn get_monthly_totals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<MonthlyTotalsQuery>,
) -> Result<Json<ApiResponse<MonthlyTotalsItem>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let entries = load_entries(&state, &req_id.0, &RevenueFilter::default()).await?;

    let current = query
        .until
        .unwrap_or_else(|| YearMonth::from(Utc::now().date_naive()));
    let count = query.months.unwrap_or(6).clamp(1, 36);
    let totals = MonthlyTotals::from_entries(&entries);

    Ok(Json(ApiResponse::new(
        req_id.0,
        MonthlyTotalsItem {
            months: totals.recent_months(current, count),
            current_month: current,
            previous_month: current.previous(),
        },
    )))
}

pub(super) async fn get_top_creators(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TopCreatorsQuery>,
) -> Result<Json<ApiResponse<Vec<CreatorTotal>>>, ApiError> {
    require_admin(&req_id.0, &user)?;
    let filter = RevenueFilter {
        month: query.month,
        ..RevenueFilter::default()
    };
    let entries = load_entries(&state, &req_id.0, &filter).await?;
    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(1);

    Ok(Json(ApiResponse::new(
        req_id.0,
        top_creators(&entries, limit),
    )))
}
