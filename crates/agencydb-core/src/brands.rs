use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proposals::{validate_brand_name, Priority};
use crate::CrmError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrandStatus {
    #[default]
    ToContact,
    Contacted,
    Negotiating,
    Closed,
}

impl BrandStatus {
    pub const ALL: [BrandStatus; 4] = [
        BrandStatus::ToContact,
        BrandStatus::Contacted,
        BrandStatus::Negotiating,
        BrandStatus::Closed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BrandStatus::ToContact => "TO_CONTACT",
            BrandStatus::Contacted => "CONTACTED",
            BrandStatus::Negotiating => "NEGOTIATING",
            BrandStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for BrandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BrandStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrandStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("unknown brand status '{s}'")))
    }
}

/// An agency client or prospect once actively engaged.
///
/// `name` is meant to identify one real-world brand, but nothing below the
/// converter's pre-insert lookup enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub sector: Option<String>,
    pub target_demographic: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub agent: Option<String>,
    pub priority: Priority,
    pub notes: Option<String>,
    pub suggested_creators: Option<String>,
    pub referrer: Option<String>,
    pub contact_date: Option<NaiveDate>,
    pub status: BrandStatus,
    /// Proposal this brand was converted from; never changes after insert.
    pub origin_proposal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    pub sector: Option<String>,
    pub target_demographic: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub agent: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub notes: Option<String>,
    pub suggested_creators: Option<String>,
    pub referrer: Option<String>,
    pub contact_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: BrandStatus,
    #[serde(skip)]
    pub origin_proposal_id: Option<Uuid>,
}

impl NewBrand {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] when the name is blank or too long.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        self.name = validate_brand_name(&self.name)?;
        Ok(())
    }
}

/// Only the status is mutable through the core; descriptive edits are plain CRUD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandPatch {
    pub status: Option<BrandStatus>,
    pub priority: Option<Priority>,
    pub agent: Option<String>,
    pub notes: Option<String>,
}

impl BrandPatch {
    pub fn apply(self, brand: &mut Brand) {
        if let Some(v) = self.status {
            brand.status = v;
        }
        if let Some(v) = self.priority {
            brand.priority = v;
        }
        if let Some(v) = self.agent {
            brand.agent = Some(v);
        }
        if let Some(v) = self.notes {
            brand.notes = Some(v);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BrandFilter {
    /// Case-sensitive exact match.
    pub name: Option<String>,
}

impl BrandFilter {
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    #[must_use]
    pub fn matches(&self, brand: &Brand) -> bool {
        self.name.as_deref().is_none_or(|n| brand.name == n)
    }
}
