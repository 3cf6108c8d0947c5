use agencydb_core::{
    creator_events, save_creator_platforms, Creator, CreatorEvent, CreatorFilter, CreatorPatch,
    CreatorPlatform, CurrentUser, FeeField, NewCreator, NewCreatorPlatform, GENERIC_FEE,
    PLATFORM_FEES,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_crm_error, require_admin, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct PlatformCatalog {
    pub platforms: Vec<PlatformFees>,
    /// Fields for any platform not listed above.
    pub other: &'static [FeeField],
}

#[derive(Debug, Serialize)]
pub(super) struct PlatformFees {
    pub platform: &'static str,
    pub fees: &'static [FeeField],
}

pub(super) async fn list_creators(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<CreatorFilter>,
) -> Result<Json<ApiResponse<Vec<Creator>>>, ApiError> {
    let creators = state
        .store
        .find_creators(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, creators)))
}

pub(super) async fn get_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Creator>>, ApiError> {
    let creator = state
        .store
        .get_creator(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, creator)))
}

/// POST /api/v1/creators
pub(super) async fn create_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewCreator>,
) -> Result<(StatusCode, Json<ApiResponse<Creator>>), ApiError> {
    let creator = agencydb_core::create_creator(state.store.as_ref(), body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, creator)),
    ))
}

/// PATCH /api/v1/creators/{id}
pub(super) async fn update_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreatorPatch>,
) -> Result<Json<ApiResponse<Creator>>, ApiError> {
    let creator = agencydb_core::update_creator(state.store.as_ref(), id, body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, creator)))
}

/// DELETE /api/v1/creators/{id} is admin-only; refused while money records remain.
pub(super) async fn delete_creator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&req_id.0, &user)?;
    agencydb_core::delete_creator(state.store.as_ref(), id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_platforms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CreatorPlatform>>>, ApiError> {
    let rid = &req_id.0;
    state
        .store
        .get_creator(id)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;
    let platforms = state
        .store
        .find_creator_platforms(id)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, platforms)))
}

/// PUT /api/v1/creators/{id}/platforms replaces the whole list.
pub(super) async fn replace_platforms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<Vec<NewCreatorPlatform>>,
) -> Result<Json<ApiResponse<Vec<CreatorPlatform>>>, ApiError> {
    let platforms = save_creator_platforms(state.store.as_ref(), id, body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, platforms)))
}

pub(super) async fn list_creator_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CreatorEvent>>>, ApiError> {
    let events = creator_events(state.store.as_ref(), id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, events)))
}

/// GET /api/v1/platforms
pub(super) async fn get_platform_catalog(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<PlatformCatalog>> {
    let platforms = PLATFORM_FEES
        .iter()
        .map(|&(platform, fees)| PlatformFees { platform, fees })
        .collect();

    Json(ApiResponse::new(
        req_id.0,
        PlatformCatalog {
            platforms,
            other: GENERIC_FEE,
        },
    ))
}
