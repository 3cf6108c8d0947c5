//! Creator registry and per-platform fee tables.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborations::CollaborationFilter;
use crate::payments::PaymentFilter;
use crate::proposals::{double_option, overlay};
use crate::revenue::RevenueFilter;
use crate::store::{CollaborationStore, CreatorStore, PaymentStore, RevenueStore};
use crate::CrmError;

const MAX_NAME_LEN: usize = 200;

/// Audience size band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// 5-10K followers.
    Nano,
    /// 10-50K.
    Micro,
    /// 50-300K.
    Mid,
    /// 3M and up.
    Celebrity,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Nano, Tier::Micro, Tier::Mid, Tier::Celebrity];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Nano => "NANO",
            Tier::Micro => "MICRO",
            Tier::Mid => "MID",
            Tier::Celebrity => "CELEBRITY",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("unknown tier '{s}'")))
    }
}

/// A creator represented by the agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: Uuid,
    /// Handle or stage name; what the rest of the CRM shows.
    pub name: String,
    pub full_name: Option<String>,
    pub status: Option<String>,
    pub tier: Option<Tier>,
    pub topic: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub agent: Option<String>,
    pub contract_type: Option<String>,
    /// Agency commission, percent of gross.
    pub commission_pct: Option<Decimal>,
    pub collaboration_start: Option<NaiveDate>,
    pub contract_signed_date: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub media_kit: Option<String>,
    pub media_kit_updated: Option<NaiveDate>,
    pub adv_category: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCreator {
    pub name: String,
    pub full_name: Option<String>,
    pub status: Option<String>,
    pub tier: Option<Tier>,
    pub topic: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub agent: Option<String>,
    pub contract_type: Option<String>,
    pub commission_pct: Option<Decimal>,
    pub collaboration_start: Option<NaiveDate>,
    pub contract_signed_date: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub media_kit: Option<String>,
    pub media_kit_updated: Option<NaiveDate>,
    pub adv_category: Option<String>,
    pub notes: Option<String>,
}

impl NewCreator {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trims the name and blanks empty text fields to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a blank or overlong name, an email
    /// without `@`, a commission outside 0-100, or a contract that ends before
    /// it starts.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        self.name = validate_creator_name(&self.name)?;
        for field in [
            &mut self.full_name,
            &mut self.status,
            &mut self.topic,
            &mut self.email,
            &mut self.phone,
            &mut self.agent,
            &mut self.contract_type,
            &mut self.media_kit,
            &mut self.adv_category,
            &mut self.notes,
        ] {
            blank_to_none(field);
        }
        validate_email(self.email.as_deref())?;
        validate_commission(self.commission_pct)?;
        validate_contract_window(self.collaboration_start, self.contract_end)
    }
}

/// `None` keeps a field; `Some(None)` clears an optional one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tier: Option<Option<Tier>>,
    #[serde(default, deserialize_with = "double_option")]
    pub topic: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub agent: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contract_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub commission_pct: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub collaboration_start: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contract_signed_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contract_end: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub media_kit: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub media_kit_updated: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub adv_category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl CreatorPatch {
    /// Checks the fields the patch sets. The contract window is checked
    /// against the merged record by [`update_creator`].
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a blank name, a malformed email or
    /// a commission outside 0-100.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        if let Some(name) = self.name.as_mut() {
            *name = validate_creator_name(name)?;
        }
        if let Some(Some(email)) = &self.email {
            validate_email(Some(email.as_str()))?;
        }
        if let Some(commission) = self.commission_pct {
            validate_commission(commission)?;
        }
        Ok(())
    }

    pub fn apply(self, creator: &mut Creator) {
        if let Some(v) = self.name {
            creator.name = v;
        }
        overlay(&mut creator.full_name, self.full_name);
        overlay(&mut creator.status, self.status);
        overlay(&mut creator.tier, self.tier);
        overlay(&mut creator.topic, self.topic);
        overlay(&mut creator.email, self.email);
        overlay(&mut creator.phone, self.phone);
        overlay(&mut creator.agent, self.agent);
        overlay(&mut creator.contract_type, self.contract_type);
        overlay(&mut creator.commission_pct, self.commission_pct);
        overlay(&mut creator.collaboration_start, self.collaboration_start);
        overlay(&mut creator.contract_signed_date, self.contract_signed_date);
        overlay(&mut creator.contract_end, self.contract_end);
        overlay(&mut creator.media_kit, self.media_kit);
        overlay(&mut creator.media_kit_updated, self.media_kit_updated);
        overlay(&mut creator.adv_category, self.adv_category);
        overlay(&mut creator.notes, self.notes);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatorFilter {
    /// Case-insensitive substring of the name or the full name.
    pub search: Option<String>,
    pub tier: Option<Tier>,
}

impl CreatorFilter {
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, creator: &Creator) -> bool {
        let term_matches = self.search.as_deref().is_none_or(|term| {
            let term = term.to_lowercase();
            creator.name.to_lowercase().contains(&term)
                || creator
                    .full_name
                    .as_deref()
                    .is_some_and(|full| full.to_lowercase().contains(&term))
        });
        term_matches && self.tier.is_none_or(|t| creator.tier == Some(t))
    }
}

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

/// One fee a creator quotes on a platform, e.g. Instagram stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeField {
    pub key: &'static str,
    pub label: &'static str,
}

/// The fee fields of the platforms with a dedicated price list.
pub const PLATFORM_FEES: &[(&str, &[FeeField])] = &[
    (
        "YouTube",
        &[FeeField {
            key: "integration",
            label: "Video integration",
        }],
    ),
    (
        "Instagram",
        &[
            FeeField {
                key: "stories",
                label: "Stories",
            },
            FeeField {
                key: "story_set",
                label: "Story set",
            },
            FeeField {
                key: "post_reel",
                label: "Post / Reel",
            },
        ],
    ),
    (
        "TikTok",
        &[FeeField {
            key: "video",
            label: "TikTok video",
        }],
    ),
    (
        "Twitch",
        &[FeeField {
            key: "screen_logo",
            label: "On-screen logo + CTA",
        }],
    ),
];

/// Platforms without a dedicated price list quote a single fee.
pub const GENERIC_FEE: &[FeeField] = &[FeeField {
    key: "fee",
    label: "Fee",
}];

/// Fee fields accepted for `platform`. Names match exactly.
#[must_use]
pub fn fee_fields(platform: &str) -> &'static [FeeField] {
    PLATFORM_FEES
        .iter()
        .find(|(name, _)| *name == platform)
        .map_or(GENERIC_FEE, |(_, fields)| *fields)
}

/// A creator's presence and price list on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorPlatform {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub platform: String,
    pub tier: Option<Tier>,
    /// Keyed by [`FeeField::key`].
    pub fees: BTreeMap<String, Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCreatorPlatform {
    pub platform: String,
    pub tier: Option<Tier>,
    #[serde(default)]
    pub fees: BTreeMap<String, Decimal>,
    pub notes: Option<String>,
}

impl NewCreatorPlatform {
    #[must_use]
    pub fn on(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fee(mut self, key: &str, amount: Decimal) -> Self {
        self.fees.insert(key.to_string(), amount);
        self
    }

    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a blank platform, a fee key the
    /// platform does not quote, or a negative fee.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        self.platform = self.platform.trim().to_string();
        if self.platform.is_empty() {
            return Err(CrmError::Validation(
                "platform name must not be empty".to_string(),
            ));
        }
        let fields = fee_fields(&self.platform);
        for (key, amount) in &self.fees {
            if !fields.iter().any(|f| f.key == key) {
                return Err(CrmError::Validation(format!(
                    "{} has no fee '{key}'",
                    self.platform
                )));
            }
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(CrmError::Validation(format!(
                    "fee '{key}' on {} must not be negative, got {amount}",
                    self.platform
                )));
            }
        }
        blank_to_none(&mut self.notes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`CrmError::Validation`] for invalid input, or the store error.
pub async fn create_creator<S>(store: &S, mut new: NewCreator) -> Result<Creator, CrmError>
where
    S: CreatorStore + ?Sized,
{
    new.validate()?;
    let creator = store.insert_creator(new).await?;
    tracing::info!(creator_id = %creator.id, name = %creator.name, "creator created");
    Ok(creator)
}

/// # Errors
///
/// Returns [`CrmError::NotFound`] if the creator does not exist,
/// [`CrmError::Validation`] for invalid input, or the store error.
pub async fn update_creator<S>(
    store: &S,
    id: Uuid,
    mut patch: CreatorPatch,
) -> Result<Creator, CrmError>
where
    S: CreatorStore + ?Sized,
{
    patch.validate()?;
    if patch.collaboration_start.is_some() || patch.contract_end.is_some() {
        let mut merged = store.get_creator(id).await?;
        patch.clone().apply(&mut merged);
        validate_contract_window(merged.collaboration_start, merged.contract_end)?;
    }
    store.update_creator(id, patch).await
}

/// Delete a creator together with their platforms and event participations.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the creator does not exist, and
/// [`CrmError::Conflict`] while collaborations, revenue or payments still
/// reference them.
pub async fn delete_creator<S>(store: &S, id: Uuid) -> Result<(), CrmError>
where
    S: CreatorStore + CollaborationStore + RevenueStore + PaymentStore + ?Sized,
{
    store.get_creator(id).await?;

    let collaborations = store
        .find_collaborations(&CollaborationFilter {
            creator_id: Some(id),
            ..CollaborationFilter::default()
        })
        .await?
        .len();
    let revenue = store
        .find_revenue(&RevenueFilter {
            creator_id: Some(id),
            ..RevenueFilter::default()
        })
        .await?
        .len();
    let payments = store
        .find_payments(&PaymentFilter {
            creator_id: Some(id),
            ..PaymentFilter::default()
        })
        .await?
        .len();
    if collaborations + revenue + payments > 0 {
        return Err(CrmError::Conflict(format!(
            "creator {id} still has {collaborations} collaborations, \
             {revenue} revenue rows and {payments} payments"
        )));
    }

    store.delete_creator(id).await?;
    tracing::info!(creator_id = %id, "creator deleted");
    Ok(())
}

/// Replace every platform of a creator with `platforms`.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the creator does not exist,
/// [`CrmError::Validation`] for an invalid entry or a platform listed twice,
/// or the store error.
pub async fn save_creator_platforms<S>(
    store: &S,
    creator_id: Uuid,
    mut platforms: Vec<NewCreatorPlatform>,
) -> Result<Vec<CreatorPlatform>, CrmError>
where
    S: CreatorStore + ?Sized,
{
    let mut seen = BTreeSet::new();
    for platform in &mut platforms {
        platform.validate()?;
        if !seen.insert(platform.platform.clone()) {
            return Err(CrmError::Validation(format!(
                "platform {} listed twice",
                platform.platform
            )));
        }
    }
    store.get_creator(creator_id).await?;

    let saved = store
        .replace_creator_platforms(creator_id, platforms)
        .await?;
    tracing::info!(%creator_id, platforms = saved.len(), "creator platforms saved");
    Ok(saved)
}

/// Resolve a creator named by another record.
///
/// # Errors
///
/// Returns [`CrmError::Validation`] when no such creator exists, or the store error.
pub async fn ensure_creator<S>(store: &S, creator_id: Uuid) -> Result<Creator, CrmError>
where
    S: CreatorStore + ?Sized,
{
    match store.get_creator(creator_id).await {
        Err(e) if e.is_not_found() => Err(CrmError::Validation(format!(
            "unknown creator {creator_id}"
        ))),
        other => other,
    }
}

fn validate_creator_name(raw: &str) -> Result<String, CrmError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CrmError::Validation(
            "creator name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CrmError::Validation(format!(
            "creator name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_email(email: Option<&str>) -> Result<(), CrmError> {
    match email.map(|e| e.split_once('@')) {
        None => Ok(()),
        Some(Some((user, domain))) if !user.is_empty() && domain.contains('.') => Ok(()),
        Some(_) => Err(CrmError::Validation(format!(
            "invalid email '{}'",
            email.unwrap_or_default()
        ))),
    }
}

fn validate_commission(commission: Option<Decimal>) -> Result<(), CrmError> {
    match commission {
        Some(pct) if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED => Err(
            CrmError::Validation(format!("commission_pct must be 0-100, got {pct}")),
        ),
        _ => Ok(()),
    }
}

fn validate_contract_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), CrmError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(CrmError::Validation(format!(
            "contract_end {end} is before collaboration_start {start}"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn blank_to_none(field: &mut Option<String>) {
    *field = field.take().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CreatorStore;
    use crate::{CollaborationStore, InMemoryStore, NewCollaboration};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_creator_is_trimmed_and_blank_fields_dropped() {
        let mut new = NewCreator {
            email: Some("  ".to_string()),
            topic: Some(" gaming ".to_string()),
            ..NewCreator::named("  Nova  ")
        };
        new.validate().unwrap();
        assert_eq!(new.name, "Nova");
        assert_eq!(new.email, None);
        assert_eq!(new.topic.as_deref(), Some("gaming"));
    }

    #[test]
    fn new_creator_rejects_bad_input() {
        let cases = [
            NewCreator::named("   "),
            NewCreator {
                email: Some("nova.example.com".to_string()),
                ..NewCreator::named("Nova")
            },
            NewCreator {
                commission_pct: Some(Decimal::new(101, 0)),
                ..NewCreator::named("Nova")
            },
            NewCreator {
                collaboration_start: Some(date(2024, 5, 1)),
                contract_end: Some(date(2024, 4, 30)),
                ..NewCreator::named("Nova")
            },
        ];
        for mut new in cases {
            let err = new.validate().expect_err("should be rejected");
            assert!(matches!(err, CrmError::Validation(_)), "{err}");
        }
    }

    #[test]
    fn search_is_case_insensitive_over_both_names() {
        let now = Utc::now();
        let creator = Creator {
            id: Uuid::new_v4(),
            name: "Nova".to_string(),
            full_name: Some("Giulia Rossi".to_string()),
            status: None,
            tier: Some(Tier::Micro),
            topic: None,
            email: None,
            phone: None,
            agent: None,
            contract_type: None,
            commission_pct: None,
            collaboration_start: None,
            contract_signed_date: None,
            contract_end: None,
            media_kit: None,
            media_kit_updated: None,
            adv_category: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert!(CreatorFilter::search("NOV").matches(&creator));
        assert!(CreatorFilter::search("rossi").matches(&creator));
        assert!(!CreatorFilter::search("bianchi").matches(&creator));
        assert!(!CreatorFilter {
            tier: Some(Tier::Mid),
            ..CreatorFilter::default()
        }
        .matches(&creator));
    }

    #[test]
    fn fee_keys_follow_the_platform_price_list() {
        assert_eq!(fee_fields("Instagram").len(), 3);
        assert_eq!(fee_fields("Kick"), GENERIC_FEE);

        let mut ok = NewCreatorPlatform::on(" Instagram ").with_fee("stories", Decimal::new(300, 0));
        ok.validate().unwrap();
        assert_eq!(ok.platform, "Instagram");

        let mut wrong_key = NewCreatorPlatform::on("YouTube").with_fee("stories", Decimal::ONE);
        assert!(wrong_key.validate().is_err());

        let mut negative = NewCreatorPlatform::on("Kick").with_fee("fee", Decimal::new(-1, 0));
        assert!(negative.validate().is_err());
    }

    #[test]
    fn tier_parses_wire_names() {
        assert_eq!("CELEBRITY".parse::<Tier>().unwrap(), Tier::Celebrity);
        assert!("celebrity".parse::<Tier>().is_err());
    }

    #[tokio::test]
    async fn saving_platforms_replaces_the_previous_list() {
        let store = InMemoryStore::new();
        let creator = create_creator(&store, NewCreator::named("Nova")).await.unwrap();

        save_creator_platforms(
            &store,
            creator.id,
            vec![
                NewCreatorPlatform::on("YouTube").with_fee("integration", Decimal::new(1200, 0)),
                NewCreatorPlatform::on("Twitch"),
            ],
        )
        .await
        .unwrap();
        let saved = save_creator_platforms(
            &store,
            creator.id,
            vec![NewCreatorPlatform::on("TikTok").with_fee("video", Decimal::new(400, 0))],
        )
        .await
        .unwrap();

        assert_eq!(saved.len(), 1);
        let stored = store.find_creator_platforms(creator.id).await.unwrap();
        assert_eq!(stored, saved);
        assert_eq!(stored[0].fees["video"], Decimal::new(400, 0));
    }

    #[tokio::test]
    async fn duplicate_platforms_are_rejected_before_writing() {
        let store = InMemoryStore::new();
        let creator = create_creator(&store, NewCreator::named("Nova")).await.unwrap();
        save_creator_platforms(&store, creator.id, vec![NewCreatorPlatform::on("Twitch")])
            .await
            .unwrap();

        let err = save_creator_platforms(
            &store,
            creator.id,
            vec![NewCreatorPlatform::on("Kick"), NewCreatorPlatform::on(" Kick")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CrmError::Validation(_)));
        let kept = store.find_creator_platforms(creator.id).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].platform, "Twitch");
    }

    #[tokio::test]
    async fn platforms_of_unknown_creator_are_not_found() {
        let store = InMemoryStore::new();
        let err = save_creator_platforms(&store, Uuid::new_v4(), vec![])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_checks_the_merged_contract_window() {
        let store = InMemoryStore::new();
        let creator = create_creator(
            &store,
            NewCreator {
                collaboration_start: Some(date(2024, 1, 1)),
                ..NewCreator::named("Nova")
            },
        )
        .await
        .unwrap();

        let err = update_creator(
            &store,
            creator.id,
            CreatorPatch {
                contract_end: Some(Some(date(2023, 12, 31))),
                ..CreatorPatch::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));

        let updated = update_creator(
            &store,
            creator.id,
            CreatorPatch {
                contract_end: Some(Some(date(2024, 12, 31))),
                topic: Some(Some("tech".to_string())),
                ..CreatorPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.contract_end, Some(date(2024, 12, 31)));
        assert_eq!(updated.topic.as_deref(), Some("tech"));
    }

    #[tokio::test]
    async fn creator_with_collaborations_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let creator = create_creator(&store, NewCreator::named("Nova")).await.unwrap();
        let collaboration = store
            .insert_collaboration(NewCollaboration::new(creator.id, "Acme"))
            .await
            .unwrap();

        let err = delete_creator(&store, creator.id).await.unwrap_err();
        assert!(matches!(err, CrmError::Conflict(_)), "{err}");

        store.delete_collaboration(collaboration.id).await.unwrap();
        delete_creator(&store, creator.id).await.unwrap();
        assert!(store.get_creator(creator.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unknown_creator_reference_is_a_validation_error() {
        let store = InMemoryStore::new();
        let err = ensure_creator(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
    }
}
