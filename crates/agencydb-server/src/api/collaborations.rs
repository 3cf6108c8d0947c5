//! Collaboration handlers. Every write re-derives the revenue row; a failed
//! sync is reported next to the saved collaboration instead of failing it.

use agencydb_core::{
    Collaboration, CollaborationFilter, CollaborationPatch, CollaborationStats,
    CollaborationUpdate, CrmError, NewCollaboration, SyncOutcome,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_crm_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(super) enum SyncStatus {
    Synced { result: SyncOutcome },
    Failed { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
pub(super) struct CollaborationWriteItem {
    pub collaboration: Collaboration,
    pub revenue_sync: SyncStatus,
}

impl From<CollaborationUpdate> for CollaborationWriteItem {
    fn from(update: CollaborationUpdate) -> Self {
        let revenue_sync = match update.sync {
            Ok(result) => SyncStatus::Synced { result },
            Err(e) => SyncStatus::Failed {
                code: sync_error_code(&e),
                message: e.to_string(),
            },
        };
        Self {
            collaboration: update.collaboration,
            revenue_sync,
        }
    }
}

fn sync_error_code(error: &CrmError) -> &'static str {
    match error {
        CrmError::MissingData { .. } => "unprocessable",
        CrmError::NotFound { .. } => "not_found",
        CrmError::Validation(_) => "validation_error",
        CrmError::Conflict(_) => "conflict",
        CrmError::Forbidden(_) => "forbidden",
        CrmError::StoreUnavailable(_) => "internal_error",
    }
}

pub(super) async fn list_collaborations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<CollaborationFilter>,
) -> Result<Json<ApiResponse<Vec<Collaboration>>>, ApiError> {
    let collaborations = state
        .store
        .find_collaborations(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, collaborations)))
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<CollaborationFilter>,
) -> Result<Json<ApiResponse<CollaborationStats>>, ApiError> {
    let collaborations = state
        .store
        .find_collaborations(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        CollaborationStats::from_collaborations(&collaborations),
    )))
}

pub(super) async fn get_collaboration(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Collaboration>>, ApiError> {
    let collaboration = state
        .store
        .get_collaboration(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, collaboration)))
}

/// POST /api/v1/collaborations
pub(super) async fn create_collaboration(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewCollaboration>,
) -> Result<(StatusCode, Json<ApiResponse<CollaborationWriteItem>>), ApiError> {
    let update = agencydb_core::create_collaboration(state.store.as_ref(), body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, update.into())),
    ))
}

/// PATCH /api/v1/collaborations/{id}
pub(super) async fn update_collaboration(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<CollaborationPatch>,
) -> Result<Json<ApiResponse<CollaborationWriteItem>>, ApiError> {
    let update = agencydb_core::update_collaboration(state.store.as_ref(), id, body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, update.into())))
}

/// DELETE /api/v1/collaborations/{id}; the synced revenue row goes with it.
pub(super) async fn delete_collaboration(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_collaboration(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    tracing::info!(collaboration_id = %id, "collaboration deleted");

    Ok(StatusCode::NO_CONTENT)
}
