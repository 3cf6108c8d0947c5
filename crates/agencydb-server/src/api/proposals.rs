//! Proposal pipeline handlers: CRUD, kanban board, stage moves, conversion.

use agencydb_core::{
    convert_to_brand, move_to_stage, Conversion, NewProposal, PipelineBoard, PipelineStats,
    Proposal, ProposalFilter, ProposalPatch, ProposalStage, StageMove,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_crm_error, parse_website_or_validation_error, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct MoveStageRequest {
    pub stage: ProposalStage,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub(super) async fn list_proposals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<ProposalFilter>,
) -> Result<Json<ApiResponse<Vec<Proposal>>>, ApiError> {
    let proposals = state
        .store
        .find_proposals(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, proposals)))
}

pub(super) async fn get_board(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PipelineBoard>>, ApiError> {
    let proposals = state
        .store
        .find_proposals(&ProposalFilter::default())
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        PipelineBoard::from_proposals(proposals),
    )))
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PipelineStats>>, ApiError> {
    let proposals = state
        .store
        .find_proposals(&ProposalFilter::default())
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        PipelineStats::from_proposals(&proposals),
    )))
}

pub(super) async fn get_proposal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Proposal>>, ApiError> {
    let proposal = state
        .store
        .get_proposal(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, proposal)))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/proposals
pub(super) async fn create_proposal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(mut body): Json<NewProposal>,
) -> Result<(StatusCode, Json<ApiResponse<Proposal>>), ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| map_crm_error(rid.clone(), &e))?;
    parse_website_or_validation_error(body.website.as_deref(), rid)?;

    let proposal = state
        .store
        .insert_proposal(body)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;
    tracing::info!(proposal_id = %proposal.id, brand_name = %proposal.brand_name, "proposal created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, proposal)),
    ))
}

/// PATCH /api/v1/proposals/{id}
pub(super) async fn update_proposal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(mut body): Json<ProposalPatch>,
) -> Result<Json<ApiResponse<Proposal>>, ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| map_crm_error(rid.clone(), &e))?;
    if let Some(website) = &body.website {
        parse_website_or_validation_error(website.as_deref(), rid)?;
    }

    let proposal = state
        .store
        .update_proposal(id, body)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, proposal)))
}

/// DELETE /api/v1/proposals/{id}
pub(super) async fn delete_proposal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_proposal(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    tracing::info!(proposal_id = %id, "proposal deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/proposals/{id}/stage
pub(super) async fn move_stage(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveStageRequest>,
) -> Result<Json<ApiResponse<StageMove>>, ApiError> {
    let moved = move_to_stage(state.store.as_ref(), id, body.stage)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, moved)))
}

/// POST /api/v1/proposals/{id}/convert
///
/// `201` when a brand was created, `200` when one with the same name existed.
pub(super) async fn convert_proposal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<Conversion>>), ApiError> {
    let conversion = convert_to_brand(state.store.as_ref(), id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    let status = if conversion.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::new(req_id.0, conversion))))
}
