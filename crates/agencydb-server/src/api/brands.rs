use agencydb_core::{Brand, BrandFilter, BrandPatch, NewBrand};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_crm_error, parse_website_or_validation_error, ApiError, ApiResponse, AppState,
};

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<BrandFilter>,
) -> Result<Json<ApiResponse<Vec<Brand>>>, ApiError> {
    let brands = state
        .store
        .find_brands(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, brands)))
}

pub(super) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Brand>>, ApiError> {
    let brand = state
        .store
        .get_brand(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, brand)))
}

/// POST /api/v1/brands: direct entry, without a proposal behind it.
pub(super) async fn create_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(mut body): Json<NewBrand>,
) -> Result<(StatusCode, Json<ApiResponse<Brand>>), ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| map_crm_error(rid.clone(), &e))?;
    parse_website_or_validation_error(body.website.as_deref(), rid)?;
    body.origin_proposal_id = None;

    let brand = state
        .store
        .insert_brand(body)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;
    tracing::info!(brand_id = %brand.id, name = %brand.name, "brand created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, brand))))
}

/// PATCH /api/v1/brands/{id}: status, priority, agent and notes.
pub(super) async fn update_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<BrandPatch>,
) -> Result<Json<ApiResponse<Brand>>, ApiError> {
    let brand = state
        .store
        .update_brand(id, body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, brand)))
}

pub(super) async fn delete_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_brand(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    tracing::info!(brand_id = %id, "brand deleted");

    Ok(StatusCode::NO_CONTENT)
}
