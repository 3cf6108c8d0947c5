mod brands;
mod collaborations;
mod creators;
mod events;
mod payments;
mod proposals;
mod revenue;

use std::{sync::Arc, time::Duration};

use agencydb_core::{CrmError, CrmStore, CurrentUser};
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CrmStore>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "unprocessable" => StatusCode::UNPROCESSABLE_ENTITY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(10).clamp(1, 200)
}

/// Maps a domain error onto the API error envelope.
///
/// Store failures are logged here and reported without their detail.
pub(super) fn map_crm_error(request_id: String, error: &CrmError) -> ApiError {
    match error {
        CrmError::NotFound { .. } => ApiError::new(request_id, "not_found", error.to_string()),
        CrmError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        CrmError::Forbidden(message) => ApiError::new(request_id, "forbidden", message.clone()),
        CrmError::Conflict(message) => ApiError::new(request_id, "conflict", message.clone()),
        CrmError::MissingData { .. } => {
            ApiError::new(request_id, "unprocessable", error.to_string())
        }
        CrmError::StoreUnavailable(_) => {
            tracing::error!(error = %error, "store operation failed");
            ApiError::new(request_id, "internal_error", "store operation failed")
        }
    }
}

pub(super) fn require_admin(request_id: &str, user: &CurrentUser) -> Result<(), ApiError> {
    user.require_admin().map_err(|e| {
        tracing::warn!(user_id = %user.id, role = %user.role, "admin-only endpoint refused");
        map_crm_error(request_id.to_string(), &e)
    })
}

/// Accepts bare hosts like `www.acme.it` by assuming `https`.
pub(super) fn parse_website_or_validation_error(
    value: Option<&str>,
    request_id: &str,
) -> Result<(), ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    match reqwest::Url::parse(&candidate) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            format!("website is not a valid URL: {raw}"),
        )),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/proposals",
            get(proposals::list_proposals).post(proposals::create_proposal),
        )
        .route("/api/v1/proposals/board", get(proposals::get_board))
        .route("/api/v1/proposals/stats", get(proposals::get_stats))
        .route(
            "/api/v1/proposals/{id}",
            get(proposals::get_proposal)
                .patch(proposals::update_proposal)
                .delete(proposals::delete_proposal),
        )
        .route("/api/v1/proposals/{id}/stage", post(proposals::move_stage))
        .route(
            "/api/v1/proposals/{id}/convert",
            post(proposals::convert_proposal),
        )
        .route(
            "/api/v1/brands",
            get(brands::list_brands).post(brands::create_brand),
        )
        .route(
            "/api/v1/brands/{id}",
            get(brands::get_brand)
                .patch(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route(
            "/api/v1/creators",
            get(creators::list_creators).post(creators::create_creator),
        )
        .route(
            "/api/v1/creators/{id}",
            get(creators::get_creator)
                .patch(creators::update_creator)
                .delete(creators::delete_creator),
        )
        .route(
            "/api/v1/creators/{id}/platforms",
            get(creators::list_platforms).put(creators::replace_platforms),
        )
        .route(
            "/api/v1/creators/{id}/events",
            get(creators::list_creator_events),
        )
        .route("/api/v1/platforms", get(creators::get_platform_catalog))
        .route(
            "/api/v1/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/v1/events/{id}",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/api/v1/events/{id}/participations",
            get(events::list_participations).post(events::create_participation),
        )
        .route(
            "/api/v1/participations/{id}",
            patch(events::update_participation)
                .delete(events::delete_participation),
        )
        .route(
            "/api/v1/collaborations",
            get(collaborations::list_collaborations).post(collaborations::create_collaboration),
        )
        .route(
            "/api/v1/collaborations/stats",
            get(collaborations::get_stats),
        )
        .route(
            "/api/v1/collaborations/{id}",
            get(collaborations::get_collaboration)
                .patch(collaborations::update_collaboration)
                .delete(collaborations::delete_collaboration),
        )
        .route(
            "/api/v1/revenue",
            get(revenue::list_revenue).put(revenue::upsert_manual_revenue),
        )
        .route("/api/v1/revenue/{id}", delete(revenue::delete_revenue))
        .route(
            "/api/v1/revenue/discrepancies",
            get(revenue::list_discrepancies),
        )
        .route(
            "/api/v1/revenue/monthly-totals",
            get(revenue::get_monthly_totals),
        )
        .route("/api/v1/revenue/top-creators", get(revenue::get_top_creators))
        .route(
            "/api/v1/payments",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/api/v1/payments/stats", get(payments::get_stats))
        .route(
            "/api/v1/payments/{id}/verify",
            post(payments::toggle_verified),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;
