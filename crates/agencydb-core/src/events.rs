//! Fairs and conventions, and which creators take part in them.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::creators::{blank_to_none, ensure_creator, Creator, CreatorFilter};
use crate::proposals::{double_option, overlay};
use crate::store::{CreatorStore, EventStore};
use crate::CrmError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    Panel,
    Workshop,
    RpgMaster,
    BoardGames,
    CosplayJudge,
    Signing,
    Stage,
    Moderation,
    Accreditation,
}

impl Activity {
    pub const ALL: [Activity; 9] = [
        Activity::Panel,
        Activity::Workshop,
        Activity::RpgMaster,
        Activity::BoardGames,
        Activity::CosplayJudge,
        Activity::Signing,
        Activity::Stage,
        Activity::Moderation,
        Activity::Accreditation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Panel => "PANEL",
            Activity::Workshop => "WORKSHOP",
            Activity::RpgMaster => "RPG_MASTER",
            Activity::BoardGames => "BOARD_GAMES",
            Activity::CosplayJudge => "COSPLAY_JUDGE",
            Activity::Signing => "SIGNING",
            Activity::Stage => "STAGE",
            Activity::Moderation => "MODERATION",
            Activity::Accreditation => "ACCREDITATION",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Activity {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .into_iter()
            .find(|activity| activity.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("unknown activity '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    /// Fair, convention, launch...
    pub kind: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub kind: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
}

impl NewEvent {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a blank name or an event that ends
    /// before it starts.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        self.name = validate_event_name(&self.name)?;
        for field in [
            &mut self.kind,
            &mut self.location,
            &mut self.city,
            &mut self.description,
            &mut self.link,
            &mut self.notes,
        ] {
            blank_to_none(field);
        }
        validate_dates(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl EventPatch {
    pub fn apply(self, event: &mut Event) {
        if let Some(v) = self.name {
            event.name = v;
        }
        overlay(&mut event.kind, self.kind);
        overlay(&mut event.start_date, self.start_date);
        overlay(&mut event.end_date, self.end_date);
        overlay(&mut event.location, self.location);
        overlay(&mut event.city, self.city);
        overlay(&mut event.description, self.description);
        overlay(&mut event.link, self.link);
        overlay(&mut event.notes, self.notes);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventFilter {
    /// Exact match.
    pub city: Option<String>,
    /// Events still running on or after this day. Undated events always match.
    pub from: Option<NaiveDate>,
}

impl EventFilter {
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let last_day = event.end_date.or(event.start_date);
        self.city
            .as_deref()
            .is_none_or(|c| event.city.as_deref() == Some(c))
            && self
                .from
                .is_none_or(|from| last_day.is_none_or(|day| day >= from))
    }
}

/// A creator's booking at an event. One per creator and event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub creator_id: Uuid,
    pub contract_type: Option<String>,
    pub activities: BTreeSet<Activity>,
    pub fee: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The event comes from the route, not the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipation {
    pub creator_id: Uuid,
    pub contract_type: Option<String>,
    #[serde(default)]
    pub activities: BTreeSet<Activity>,
    pub fee: Option<Decimal>,
    pub notes: Option<String>,
}

impl NewParticipation {
    #[must_use]
    pub fn of(creator_id: Uuid) -> Self {
        Self {
            creator_id,
            contract_type: None,
            activities: BTreeSet::new(),
            fee: None,
            notes: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a negative fee.
    pub fn validate(&mut self) -> Result<(), CrmError> {
        blank_to_none(&mut self.contract_type);
        blank_to_none(&mut self.notes);
        validate_fee(self.fee)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub contract_type: Option<Option<String>>,
    /// Replaces the whole set.
    pub activities: Option<BTreeSet<Activity>>,
    #[serde(default, deserialize_with = "double_option")]
    pub fee: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl ParticipationPatch {
    /// # Errors
    ///
    /// Returns [`CrmError::Validation`] for a negative fee.
    pub fn validate(&self) -> Result<(), CrmError> {
        validate_fee(self.fee.flatten())
    }

    pub fn apply(self, participation: &mut Participation) {
        overlay(&mut participation.contract_type, self.contract_type);
        if let Some(v) = self.activities {
            participation.activities = v;
        }
        overlay(&mut participation.fee, self.fee);
        overlay(&mut participation.notes, self.notes);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParticipationFilter {
    pub event_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
}

impl ParticipationFilter {
    #[must_use]
    pub fn at_event(event_id: Uuid) -> Self {
        Self {
            event_id: Some(event_id),
            creator_id: None,
        }
    }

    #[must_use]
    pub fn of_creator(creator_id: Uuid) -> Self {
        Self {
            event_id: None,
            creator_id: Some(creator_id),
        }
    }

    #[must_use]
    pub fn matches(&self, participation: &Participation) -> bool {
        self.event_id.is_none_or(|e| participation.event_id == e)
            && self.creator_id.is_none_or(|c| participation.creator_id == c)
    }
}

/// A participation with the creator's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub participation: Participation,
    /// `None` if the creator row vanished between the two reads.
    pub creator_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub participations: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorEvent {
    pub event: Event,
    pub participation: Participation,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`CrmError::Validation`] for invalid input, or the store error.
pub async fn create_event<S>(store: &S, mut new: NewEvent) -> Result<Event, CrmError>
where
    S: EventStore + ?Sized,
{
    new.validate()?;
    let event = store.insert_event(new).await?;
    tracing::info!(event_id = %event.id, name = %event.name, "event created");
    Ok(event)
}

/// # Errors
///
/// Returns [`CrmError::NotFound`] if the event does not exist,
/// [`CrmError::Validation`] if the merged dates are out of order, or the
/// store error.
pub async fn update_event<S>(store: &S, id: Uuid, mut patch: EventPatch) -> Result<Event, CrmError>
where
    S: EventStore + ?Sized,
{
    if let Some(name) = patch.name.as_mut() {
        *name = validate_event_name(name)?;
    }
    if patch.start_date.is_some() || patch.end_date.is_some() {
        let mut merged = store.get_event(id).await?;
        patch.clone().apply(&mut merged);
        validate_dates(merged.start_date, merged.end_date)?;
    }
    store.update_event(id, patch).await
}

/// The event with its roster, names resolved in one creator read.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the event does not exist, or the store error.
pub async fn event_detail<S>(store: &S, id: Uuid) -> Result<EventDetail, CrmError>
where
    S: EventStore + CreatorStore + ?Sized,
{
    let event = store.get_event(id).await?;
    let participations = store
        .find_participations(&ParticipationFilter::at_event(id))
        .await?;
    let names: HashMap<Uuid, String> = store
        .find_creators(&CreatorFilter::default())
        .await?
        .into_iter()
        .map(|Creator { id, name, .. }| (id, name))
        .collect();

    let participations = participations
        .into_iter()
        .map(|participation| RosterEntry {
            creator_name: names.get(&participation.creator_id).cloned(),
            participation,
        })
        .collect();
    Ok(EventDetail {
        event,
        participations,
    })
}

/// Events a creator takes part in, latest first.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the creator does not exist, or the store error.
pub async fn creator_events<S>(store: &S, creator_id: Uuid) -> Result<Vec<CreatorEvent>, CrmError>
where
    S: EventStore + CreatorStore + ?Sized,
{
    store.get_creator(creator_id).await?;
    let participations = store
        .find_participations(&ParticipationFilter::of_creator(creator_id))
        .await?;
    let mut events: HashMap<Uuid, Event> = store
        .find_events(&EventFilter::default())
        .await?
        .into_iter()
        .map(|event| (event.id, event))
        .collect();

    let mut joined: Vec<CreatorEvent> = participations
        .into_iter()
        .filter_map(|participation| {
            events
                .remove(&participation.event_id)
                .map(|event| CreatorEvent {
                    event,
                    participation,
                })
        })
        .collect();
    joined.sort_by(|a, b| {
        b.event
            .start_date
            .cmp(&a.event.start_date)
            .then(a.event.name.cmp(&b.event.name))
    });
    Ok(joined)
}

/// Book a creator at an event.
///
/// # Errors
///
/// Returns [`CrmError::NotFound`] if the event does not exist,
/// [`CrmError::Validation`] for an unknown creator or a negative fee,
/// [`CrmError::Conflict`] if the creator is already booked there, or the
/// store error.
pub async fn add_participation<S>(
    store: &S,
    event_id: Uuid,
    mut new: NewParticipation,
) -> Result<Participation, CrmError>
where
    S: EventStore + CreatorStore + ?Sized,
{
    new.validate()?;
    store.get_event(event_id).await?;
    ensure_creator(store, new.creator_id).await?;

    let booked = store
        .find_participations(&ParticipationFilter {
            event_id: Some(event_id),
            creator_id: Some(new.creator_id),
        })
        .await?;
    if !booked.is_empty() {
        return Err(CrmError::Conflict(format!(
            "creator {} already takes part in event {event_id}",
            new.creator_id
        )));
    }

    let participation = store.insert_participation(event_id, new).await?;
    tracing::info!(
        participation_id = %participation.id,
        %event_id,
        creator_id = %participation.creator_id,
        "participation added"
    );
    Ok(participation)
}

fn validate_event_name(raw: &str) -> Result<String, CrmError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CrmError::Validation(
            "event name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), CrmError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(CrmError::Validation(format!(
            "end_date {end} is before start_date {start}"
        ))),
        _ => Ok(()),
    }
}

fn validate_fee(fee: Option<Decimal>) -> Result<(), CrmError> {
    match fee {
        Some(fee) if fee < Decimal::ZERO => Err(CrmError::Validation(format!(
            "fee must not be negative, got {fee}"
        ))),
        _ => Ok(()),
    }
}
