use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use agencydb_core::{ApiKeyGrant, AppConfig, CurrentUser};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer token grants used by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthState {
    grants: Arc<Vec<ApiKeyGrant>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth from the `AGENCYDB_API_KEYS` grants of a loaded config.
    ///
    /// In development, no grants disables auth and every request acts as the
    /// operator. Outside development, no grants fails startup.
    ///
    /// # Errors
    ///
    /// Returns an error when no grants are configured outside development.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::from_grants(config.api_keys.clone(), config.is_development())
    }

    pub fn from_grants(grants: Vec<ApiKeyGrant>, is_development: bool) -> anyhow::Result<Self> {
        if grants.is_empty() {
            if is_development {
                tracing::warn!(
                    "AGENCYDB_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    grants: Arc::new(Vec::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "AGENCYDB_API_KEYS is required outside development; provide token:user-id:ROLE entries"
            );
        }

        Ok(Self {
            grants: Arc::new(grants),
            enabled: true,
        })
    }

    /// Every configured token is compared, so timing does not reveal which one matched.
    fn resolve(&self, token: &str) -> Option<CurrentUser> {
        let mut found = None;
        for grant in self.grants.iter() {
            if bool::from(grant.token.as_bytes().ct_eq(token.as_bytes())) {
                found = Some(grant.user);
            }
        }
        found
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter shared by all protected routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

fn middleware_error(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(MiddlewareErrorBody {
            error: MiddlewareError { code, message },
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Resolves the bearer token to a [`CurrentUser`] request extension.
///
/// With auth disabled the request runs as [`CurrentUser::operator`].
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        req.extensions_mut().insert(CurrentUser::operator());
        return next.run(req).await;
    }

    let user = extract_bearer_token(req.headers().get(AUTHORIZATION)).and_then(|t| auth.resolve(t));

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => middleware_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return middleware_error(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        );
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
