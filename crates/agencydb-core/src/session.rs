//! The authenticated caller, passed explicitly into operations that check roles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CrmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Agent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Agent => write!(f, "AGENT"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "AGENT" => Ok(Role::Agent),
            other => Err(CrmError::Validation(format!(
                "role must be ADMIN or AGENT, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    /// Identity used by the CLI and by development servers running without API keys.
    #[must_use]
    pub fn operator() -> Self {
        Self {
            id: Uuid::nil(),
            role: Role::Admin,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Gate for admin-only areas (finance, revenue reconciliation, payments).
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Forbidden`] for non-admin users.
    pub fn require_admin(&self) -> Result<(), CrmError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CrmError::Forbidden(format!(
                "user {} with role {} is not an admin",
                self.id, self.role
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_is_rejected_from_admin_areas() {
        let agent = CurrentUser::new(Uuid::new_v4(), Role::Agent);
        assert!(matches!(agent.require_admin(), Err(CrmError::Forbidden(_))));
        assert!(CurrentUser::operator().require_admin().is_ok());
    }

    #[test]
    fn role_parses_wire_names() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("AGENT".parse::<Role>().unwrap(), Role::Agent);
        assert!("admin".parse::<Role>().is_err());
    }
}
