//! Sales proposals: prospective brand deals moving through the kanban pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::CrmError;

/// Kanban column of a proposal. Every proposal has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStage {
    ToContact,
    Contacted,
    Negotiating,
    Won,
    Lost,
}

impl ProposalStage {
    /// Board order, left to right.
    pub const ALL: [ProposalStage; 5] = [
        ProposalStage::ToContact,
        ProposalStage::Contacted,
        ProposalStage::Negotiating,
        ProposalStage::Won,
        ProposalStage::Lost,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStage::ToContact => "TO_CONTACT",
            ProposalStage::Contacted => "CONTACTED",
            ProposalStage::Negotiating => "NEGOTIATING",
            ProposalStage::Won => "WON",
            ProposalStage::Lost => "LOST",
        }
    }

    /// `WON` and `LOST` end ordinary pipeline progress but stay editable.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, ProposalStage::Won | ProposalStage::Lost)
    }
}

impl std::fmt::Display for ProposalStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProposalStage {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProposalStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("unknown proposal stage '{s}'")))
    }
}

/// Shared by proposals and brands.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Urgent,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("unknown priority '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    /// Not unique across proposals.
    pub brand_name: String,
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
    pub last_action_date: Option<NaiveDate>,
    pub stage: ProposalStage,
    /// Set once, by the brand converter.
    pub linked_brand_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    pub brand_name: String,
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
    pub last_action_date: Option<NaiveDate>,
    pub stage: Option<ProposalStage>,
}

impl NewProposal {
    #[must_use]
    pub fn named(brand_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            ..Self::default()
        }
    }

    /// Trims the brand name and rejects empty ones.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] when the name is blank or longer than 200 characters.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        self.brand_name = validate_brand_name(&self.brand_name)?;
        Ok(())
    }
}

/// Sparse update. Outer `None` keeps the stored value; for nullable columns
/// `Some(None)` clears it.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalPatch {
    pub brand_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub sector: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub target_demographic: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub agent: Option<Option<String>>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub suggested_creators: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub referrer: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_action_date: Option<Option<NaiveDate>>,
    pub stage: Option<ProposalStage>,
    #[serde(skip)]
    pub linked_brand_id: Option<Uuid>,
}

impl ProposalPatch {
    #[must_use]
    pub fn stage(stage: ProposalStage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn link_brand(brand_id: Uuid) -> Self {
        Self {
            linked_brand_id: Some(brand_id),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] when a supplied brand name is blank.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        if let Some(name) = self.brand_name.as_deref() {
            self.brand_name = Some(validate_brand_name(name)?);
        }
        Ok(())
    }

    /// Overlay the patch onto a stored proposal.
    pub fn apply(self, proposal: &mut Proposal) {
        if let Some(v) = self.brand_name {
            proposal.brand_name = v;
        }
        overlay(&mut proposal.sector, self.sector);
        overlay(&mut proposal.target_demographic, self.target_demographic);
        overlay(&mut proposal.contact_email, self.contact_email);
        overlay(&mut proposal.phone, self.phone);
        overlay(&mut proposal.website, self.website);
        overlay(&mut proposal.agent, self.agent);
        if let Some(v) = self.priority {
            proposal.priority = v;
        }
        overlay(&mut proposal.notes, self.notes);
        overlay(&mut proposal.suggested_creators, self.suggested_creators);
        overlay(&mut proposal.referrer, self.referrer);
        overlay(&mut proposal.contact_date, self.contact_date);
        overlay(&mut proposal.last_action_date, self.last_action_date);
        if let Some(v) = self.stage {
            proposal.stage = v;
        }
        if let Some(v) = self.linked_brand_id {
            proposal.linked_brand_id = Some(v);
        }
    }
}

/// Narrowing filter for `ProposalStore::find`. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProposalFilter {
    pub stage: Option<ProposalStage>,
    pub agent: Option<String>,
}

impl ProposalFilter {
    #[must_use]
    pub fn matches(&self, proposal: &Proposal) -> bool {
        self.stage.is_none_or(|s| proposal.stage == s)
            && self
                .agent
                .as_deref()
                .is_none_or(|a| proposal.agent.as_deref() == Some(a))
    }
}

/// Keeps an explicit JSON `null` distinct from an absent key.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn overlay<T>(slot: &mut Option<T>, value: Option<Option<T>>) {
    if let Some(v) = value {
        *slot = v;
    }
}

pub(crate) fn validate_brand_name(raw: &str) -> Result<String, CrmError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(CrmError::Validation(
            "brand name must be 1-200 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips_through_wire_names() {
        for stage in ProposalStage::ALL {
            assert_eq!(stage.as_str().parse::<ProposalStage>().unwrap(), stage);
        }
        assert!("CHIUSO_VINTO".parse::<ProposalStage>().is_err());
    }

    #[test]
    fn stage_serializes_screaming_snake() {
        let json = serde_json::to_string(&ProposalStage::ToContact).unwrap();
        assert_eq!(json, "\"TO_CONTACT\"");
    }

    #[test]
    fn only_won_and_lost_are_closed() {
        let closed: Vec<_> = ProposalStage::ALL
            .into_iter()
            .filter(|s| s.is_closed())
            .collect();
        assert_eq!(closed, vec![ProposalStage::Won, ProposalStage::Lost]);
    }

    #[test]
    fn priority_defaults_to_normal_and_orders_by_urgency() {
        assert_eq!(Priority::default(), Priority::Normal);
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::Low < Priority::Normal);
    }

    #[test]
    fn new_proposal_validation_trims_and_rejects_blank() {
        let mut ok = NewProposal::named("  Acme  ");
        ok.validate().unwrap();
        assert_eq!(ok.brand_name, "Acme");

        let mut blank = NewProposal::named("   ");
        assert!(matches!(blank.validate(), Err(CrmError::Validation(_))));
    }

    #[test]
    fn patch_overlays_only_supplied_fields() {
        let now = Utc::now();
        let mut proposal = Proposal {
            id: Uuid::new_v4(),
            brand_name: "Acme".to_string(),
            sector: Some("food".to_string()),
            target_demographic: None,
            contact_email: Some("a@acme.test".to_string()),
            phone: None,
            website: None,
            agent: Some("giulia".to_string()),
            priority: Priority::Normal,
            notes: None,
            suggested_creators: None,
            referrer: None,
            contact_date: None,
            last_action_date: None,
            stage: ProposalStage::ToContact,
            linked_brand_id: None,
            created_at: now,
            updated_at: now,
        };

        ProposalPatch {
            sector: Some(None),
            priority: Some(Priority::Urgent),
            ..ProposalPatch::default()
        }
        .apply(&mut proposal);

        assert_eq!(proposal.sector, None);
        assert_eq!(proposal.priority, Priority::Urgent);
        assert_eq!(proposal.contact_email.as_deref(), Some("a@acme.test"));
        assert_eq!(proposal.agent.as_deref(), Some("giulia"));
    }

    #[test]
    fn patch_json_distinguishes_null_from_absent() {
        let patch: ProposalPatch =
            serde_json::from_str(r#"{"sector": null, "priority": "HIGH"}"#).unwrap();
        assert_eq!(patch.sector, Some(None));
        assert_eq!(patch.notes, None);
        assert_eq!(patch.priority, Some(Priority::High));
    }
}
