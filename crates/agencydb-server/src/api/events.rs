//! Event handlers. Participations are read and created under their event and
//! edited or removed by their own id.

use agencydb_core::{
    add_participation, event_detail, Event, EventDetail, EventFilter, EventPatch, NewEvent,
    NewParticipation, Participation, ParticipationFilter, ParticipationPatch,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_crm_error, ApiError, ApiResponse, AppState};

pub(super) async fn list_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<EventFilter>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let events = state
        .store
        .find_events(&filter)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, events)))
}

/// GET /api/v1/events/{id} includes the roster with creator names.
pub(super) async fn get_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EventDetail>>, ApiError> {
    let detail = event_detail(state.store.as_ref(), id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, detail)))
}

pub(super) async fn create_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewEvent>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>), ApiError> {
    let event = agencydb_core::create_event(state.store.as_ref(), body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, event))))
}

pub(super) async fn update_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<EventPatch>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let event = agencydb_core::update_event(state.store.as_ref(), id, body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, event)))
}

/// DELETE /api/v1/events/{id}
pub(super) async fn delete_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_event(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    tracing::info!(event_id = %id, "event deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_participations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Participation>>>, ApiError> {
    let rid = &req_id.0;
    state
        .store
        .get_event(id)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;
    let participations = state
        .store
        .find_participations(&ParticipationFilter::at_event(id))
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, participations)))
}

/// POST /api/v1/events/{id}/participations
pub(super) async fn create_participation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewParticipation>,
) -> Result<(StatusCode, Json<ApiResponse<Participation>>), ApiError> {
    let participation = add_participation(state.store.as_ref(), id, body)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, participation)),
    ))
}

/// PATCH /api/v1/participations/{id}
pub(super) async fn update_participation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<ParticipationPatch>,
) -> Result<Json<ApiResponse<Participation>>, ApiError> {
    let rid = &req_id.0;
    body.validate().map_err(|e| map_crm_error(rid.clone(), &e))?;
    let participation = state
        .store
        .update_participation(id, body)
        .await
        .map_err(|e| map_crm_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, participation)))
}

/// DELETE /api/v1/participations/{id}
pub(super) async fn delete_participation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_participation(id)
        .await
        .map_err(|e| map_crm_error(req_id.0.clone(), &e))?;
    tracing::info!(participation_id = %id, "participation deleted");

    Ok(StatusCode::NO_CONTENT)
}
