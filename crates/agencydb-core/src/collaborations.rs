//! Collaborations (deals) between one creator and one brand.
//!
//! Every write goes through [`create_collaboration`] or
//! [`update_collaboration`], which run the revenue synchronizer right after
//! the collaboration write lands.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::creators::ensure_creator;
use crate::proposals::{double_option, overlay};
use crate::revenue_sync::{sync_from_collaboration, SyncOutcome};
use crate::store::{CollaborationStore, CreatorStore, RevenueStore};
use crate::CrmError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationStatus {
    #[default]
    Negotiating,
    Signed,
    InProgress,
    UnderReview,
    Published,
    AwaitingPayment,
    Completed,
    Cancelled,
}

impl CollaborationStatus {
    pub const ALL: [CollaborationStatus; 8] = [
        CollaborationStatus::Negotiating,
        CollaborationStatus::Signed,
        CollaborationStatus::InProgress,
        CollaborationStatus::UnderReview,
        CollaborationStatus::Published,
        CollaborationStatus::AwaitingPayment,
        CollaborationStatus::Completed,
        CollaborationStatus::Cancelled,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CollaborationStatus::Negotiating => "NEGOTIATING",
            CollaborationStatus::Signed => "SIGNED",
            CollaborationStatus::InProgress => "IN_PROGRESS",
            CollaborationStatus::UnderReview => "UNDER_REVIEW",
            CollaborationStatus::Published => "PUBLISHED",
            CollaborationStatus::AwaitingPayment => "AWAITING_PAYMENT",
            CollaborationStatus::Completed => "COMPLETED",
            CollaborationStatus::Cancelled => "CANCELLED",
        }
    }

    /// Signed or in progress.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            CollaborationStatus::Signed | CollaborationStatus::InProgress
        )
    }
}

impl std::fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CollaborationStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollaborationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("unknown collaboration status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaboration {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub brand_name: String,
    pub status: CollaborationStatus,
    pub is_paid: bool,
    pub payment_amount: Decimal,
    pub management_fee: Option<Decimal>,
    /// Drives the ledger month of the derived revenue row.
    pub contract_signed_date: Option<NaiveDate>,
    pub publication_date: Option<NaiveDate>,
    pub agent: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collaboration {
    /// Completed and paid: the only state that owns a ledger row.
    #[must_use]
    pub fn is_revenue_eligible(&self) -> bool {
        self.status == CollaborationStatus::Completed && self.is_paid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCollaboration {
    pub creator_id: Uuid,
    pub brand_name: String,
    #[serde(default)]
    pub status: CollaborationStatus,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub payment_amount: Decimal,
    pub management_fee: Option<Decimal>,
    pub contract_signed_date: Option<NaiveDate>,
    pub publication_date: Option<NaiveDate>,
    pub agent: Option<String>,
    pub notes: Option<String>,
}

impl NewCollaboration {
    #[must_use]
    pub fn new(creator_id: Uuid, brand_name: impl Into<String>) -> Self {
        Self {
            creator_id,
            brand_name: brand_name.into(),
            status: CollaborationStatus::default(),
            is_paid: false,
            payment_amount: Decimal::ZERO,
            management_fee: None,
            contract_signed_date: None,
            publication_date: None,
            agent: None,
            notes: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a blank brand name or negative amounts.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        self.brand_name = self.brand_name.trim().to_string();
        if self.brand_name.is_empty() {
            return Err(CrmError::Validation(
                "brand name must not be empty".to_string(),
            ));
        }
        validate_amount("payment_amount", self.payment_amount)?;
        if let Some(fee) = self.management_fee {
            validate_amount("management_fee", fee)?;
        }
        Ok(())
    }
}

#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaborationPatch {
    pub brand_name: Option<String>,
    pub status: Option<CollaborationStatus>,
    pub is_paid: Option<bool>,
    pub payment_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub management_fee: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contract_signed_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub publication_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub agent: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl CollaborationPatch {
    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a blank brand name or negative amounts.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        if let Some(name) = self.brand_name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(CrmError::Validation(
                    "brand name must not be empty".to_string(),
                ));
            }
        }
        if let Some(amount) = self.payment_amount {
            validate_amount("payment_amount", amount)?;
        }
        if let Some(Some(fee)) = self.management_fee {
            validate_amount("management_fee", fee)?;
        }
        Ok(())
    }

    pub fn apply(self, collaboration: &mut Collaboration) {
        if let Some(v) = self.brand_name {
            collaboration.brand_name = v;
        }
        if let Some(v) = self.status {
            collaboration.status = v;
        }
        if let Some(v) = self.is_paid {
            collaboration.is_paid = v;
        }
        if let Some(v) = self.payment_amount {
            collaboration.payment_amount = v;
        }
        overlay(&mut collaboration.management_fee, self.management_fee);
        overlay(
            &mut collaboration.contract_signed_date,
            self.contract_signed_date,
        );
        overlay(&mut collaboration.publication_date, self.publication_date);
        overlay(&mut collaboration.agent, self.agent);
        overlay(&mut collaboration.notes, self.notes);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollaborationFilter {
    pub creator_id: Option<Uuid>,
    pub brand_name: Option<String>,
}

impl CollaborationFilter {
    #[must_use]
    pub fn matches(&self, collaboration: &Collaboration) -> bool {
        self.creator_id
            .is_none_or(|c| collaboration.creator_id == c)
            && self
                .brand_name
                .as_deref()
                .is_none_or(|b| collaboration.brand_name == b)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollaborationStats {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Signed or in progress.
    pub active: usize,
    /// Sum of payment amounts over completed, paid collaborations.
    pub revenue: Decimal,
}

impl CollaborationStats {
    #[must_use]
    pub fn from_collaborations(collaborations: &[Collaboration]) -> Self {
        let mut stats = Self {
            total: collaborations.len(),
            ..Self::default()
        };
        for collaboration in collaborations {
            match collaboration.status {
                CollaborationStatus::InProgress => stats.in_progress += 1,
                CollaborationStatus::Completed => stats.completed += 1,
                _ => {}
            }
            if collaboration.status.is_active() {
                stats.active += 1;
            }
            if collaboration.is_revenue_eligible() {
                stats.revenue += collaboration.payment_amount;
            }
        }
        stats
    }
}

/// Result of a collaboration write.
///
/// `sync` is reported separately: a failed revenue sync never undoes the
/// collaboration write that preceded it.
#[derive(Debug)]
pub struct CollaborationUpdate {
    pub collaboration: Collaboration,
    pub sync: Result<SyncOutcome, CrmError>,
}

/// Insert a collaboration, then derive its revenue row if it is already
/// completed and paid.
///
/// # Errors
///
/// Returns [`CrmError::Validation`] for invalid input or an unknown creator,
/// or the store error if the insert itself fails. Sync failures are in
/// [`CollaborationUpdate::sync`].
pub async fn create_collaboration<S>(
    store: &S,
    mut new: NewCollaboration,
) -> Result<CollaborationUpdate, CrmError>
where
    S: CollaborationStore + RevenueStore + CreatorStore + ?Sized,
{
    new.validate()?;
    ensure_creator(store, new.creator_id).await?;
    let collaboration = store.insert_collaboration(new).await?;
    tracing::info!(
        collaboration_id = %collaboration.id,
        creator_id = %collaboration.creator_id,
        status = %collaboration.status,
        "collaboration created"
    );
    let sync = run_sync(store, &collaboration).await;
    Ok(CollaborationUpdate {
        collaboration,
        sync,
    })
}

/// Apply an edit to a collaboration and resynchronize its revenue row.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the collaboration does not exist, or the
/// store error if the write fails. Sync failures are in
/// [`CollaborationUpdate::sync`].
pub async fn update_collaboration<S>(
    store: &S,
    id: Uuid,
    mut patch: CollaborationPatch,
) -> Result<CollaborationUpdate, CrmError>
where
    S: CollaborationStore + RevenueStore + ?Sized,
{
    patch.validate()?;
    let collaboration = store.update_collaboration(id, patch).await?;
    tracing::info!(
        collaboration_id = %collaboration.id,
        status = %collaboration.status,
        is_paid = collaboration.is_paid,
        "collaboration updated"
    );
    let sync = run_sync(store, &collaboration).await;
    Ok(CollaborationUpdate {
        collaboration,
        sync,
    })
}

async fn run_sync<S>(store: &S, collaboration: &Collaboration) -> Result<SyncOutcome, CrmError>
where
    S: RevenueStore + ?Sized,
{
    let sync = sync_from_collaboration(store, collaboration).await;
    if let Err(e) = &sync {
        tracing::warn!(
            collaboration_id = %collaboration.id,
            error = %e,
            "revenue sync failed; collaboration write kept"
        );
    }
    sync
}

fn validate_amount(field: &str, amount: Decimal) -> Result<(), CrmError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CrmError::Validation(format!(
            "{field} must not be negative, got {amount}"
        )));
    }
    Ok(())
}
