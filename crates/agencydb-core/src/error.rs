use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Failures surfaced by the CRM operations and the store traits.
///
/// A brand-name collision during conversion is not in here: it is the
/// successful `Conversion::AlreadyExists` outcome.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{entity} {id} is missing {field}")]
    MissingData {
        entity: &'static str,
        id: Uuid,
        field: &'static str,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("validation failed: {0}")]
    Validation(String),
    /// A write collided with a uniqueness rule, e.g. a second participation
    /// of the same creator in one event.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl CrmError {
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
