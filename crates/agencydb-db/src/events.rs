//! Database operations for the `events` and `event_participations` tables.

use std::collections::BTreeSet;

use agencydb_core::{
    Activity, Event, EventFilter, EventPatch, NewEvent, NewParticipation, Participation,
    ParticipationFilter, ParticipationPatch,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{parse_column, DbError};

macro_rules! columns {
    () => {
        "id, name, kind, start_date, end_date, location, city, description, link, notes, \
         created_at, updated_at"
    };
}

macro_rules! participation_columns {
    () => {
        "id, event_id, creator_id, contract_type, activities, fee, notes, created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub name: String,
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

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            kind: row.kind,
            start_date: row.start_date,
            end_date: row.end_date,
            location: row.location,
            city: row.city,
            description: row.description,
            link: row.link,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `event_participations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipationRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub creator_id: Uuid,
    pub contract_type: Option<String>,
    pub activities: Vec<String>,
    pub fee: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ParticipationRow> for Participation {
    type Error = DbError;

    fn try_from(row: ParticipationRow) -> Result<Self, Self::Error> {
        let activities = row
            .activities
            .iter()
            .map(|activity| parse_column("activities", activity))
            .collect::<Result<BTreeSet<Activity>, _>>()?;

        Ok(Participation {
            id: row.id,
            event_id: row.event_id,
            creator_id: row.creator_id,
            contract_type: row.contract_type,
            activities,
            fee: row.fee,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn activity_names(activities: &BTreeSet<Activity>) -> Vec<&'static str> {
    activities.iter().map(|a| a.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_event(pool: &PgPool, id: Uuid) -> Result<Option<EventRow>, DbError> {
    let row = sqlx::query_as::<_, EventRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM events WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns events matching `filter`, latest start first and undated last.
/// `from` keeps events whose last day (end, else start) is on or after it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_events(pool: &PgPool, filter: &EventFilter) -> Result<Vec<EventRow>, DbError> {
    let rows = sqlx::query_as::<_, EventRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM events \
          WHERE ($1::TEXT IS NULL OR city = $1) \
            AND ($2::DATE IS NULL OR COALESCE(end_date, start_date) IS NULL \
                 OR COALESCE(end_date, start_date) >= $2) \
          ORDER BY start_date DESC NULLS LAST, created_at DESC, id"
    ))
    .bind(filter.city.as_deref())
    .bind(filter.from)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_event(pool: &PgPool, new: &NewEvent) -> Result<EventRow, DbError> {
    let row = sqlx::query_as::<_, EventRow>(concat!(
        "INSERT INTO events (id, name, kind, start_date, end_date, location, city, \
             description, link, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.kind)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(&new.location)
    .bind(&new.city)
    .bind(&new.description)
    .bind(&new.link)
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `patch` under a row lock and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no event has `id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn update_event(pool: &PgPool, id: Uuid, patch: EventPatch) -> Result<EventRow, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, EventRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM events WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let mut event = Event::from(current);
    patch.apply(&mut event);

    let row = sqlx::query_as::<_, EventRow>(concat!(
        "UPDATE events SET \
             name = $2, kind = $3, start_date = $4, end_date = $5, location = $6, city = $7, \
             description = $8, link = $9, notes = $10, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(&event.name)
    .bind(&event.kind)
    .bind(event.start_date)
    .bind(event.end_date)
    .bind(&event.location)
    .bind(&event.city)
    .bind(&event.description)
    .bind(&event.link)
    .bind(&event.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Deletes an event; its participations go with it (`ON DELETE CASCADE`).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no event has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_event(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Participations
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_participation(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ParticipationRow>, DbError> {
    let row = sqlx::query_as::<_, ParticipationRow>(concat!(
        "SELECT ",
        participation_columns!(),
        " FROM event_participations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_participations(
    pool: &PgPool,
    filter: &ParticipationFilter,
) -> Result<Vec<ParticipationRow>, DbError> {
    let rows = sqlx::query_as::<_, ParticipationRow>(concat!(
        "SELECT ",
        participation_columns!(),
        " FROM event_participations \
          WHERE ($1::UUID IS NULL OR event_id = $1) \
            AND ($2::UUID IS NULL OR creator_id = $2) \
          ORDER BY created_at, id"
    ))
    .bind(filter.event_id)
    .bind(filter.creator_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// A second booking of the same creator at `event_id` trips
/// `uq_event_participations_event_creator`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_participation(
    pool: &PgPool,
    event_id: Uuid,
    new: &NewParticipation,
) -> Result<ParticipationRow, DbError> {
    let row = sqlx::query_as::<_, ParticipationRow>(concat!(
        "INSERT INTO event_participations (id, event_id, creator_id, contract_type, \
             activities, fee, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING ",
        participation_columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(new.creator_id)
    .bind(&new.contract_type)
    .bind(activity_names(&new.activities))
    .bind(new.fee)
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `patch` under a row lock and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no participation has `id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn update_participation(
    pool: &PgPool,
    id: Uuid,
    patch: ParticipationPatch,
) -> Result<ParticipationRow, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, ParticipationRow>(concat!(
        "SELECT ",
        participation_columns!(),
        " FROM event_participations WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let mut participation = Participation::try_from(current)?;
    patch.apply(&mut participation);

    let row = sqlx::query_as::<_, ParticipationRow>(concat!(
        "UPDATE event_participations SET \
             contract_type = $2, activities = $3, fee = $4, notes = $5, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        participation_columns!()
    ))
    .bind(id)
    .bind(&participation.contract_type)
    .bind(activity_names(&participation.activities))
    .bind(participation.fee)
    .bind(&participation.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no participation has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_participation(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM event_participations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
