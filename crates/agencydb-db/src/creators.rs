//! Database operations for the `creators` and `creator_platforms` tables.

use std::collections::BTreeMap;

use agencydb_core::{
    Creator, CreatorFilter, CreatorPatch, CreatorPlatform, NewCreator, NewCreatorPlatform,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{parse_column, DbError};

macro_rules! columns {
    () => {
        "id, name, full_name, status, tier, topic, email, phone, agent, contract_type, \
         commission_pct, collaboration_start, contract_signed_date, contract_end, media_kit, \
         media_kit_updated, adv_category, notes, created_at, updated_at"
    };
}

macro_rules! platform_columns {
    () => {
        "id, creator_id, platform, tier, fees, notes, created_at"
    };
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `creators` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorRow {
    pub id: Uuid,
    pub name: String,
    pub full_name: Option<String>,
    pub status: Option<String>,
    pub tier: Option<String>,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CreatorRow> for Creator {
    type Error = DbError;

    fn try_from(row: CreatorRow) -> Result<Self, Self::Error> {
        Ok(Creator {
            id: row.id,
            name: row.name,
            full_name: row.full_name,
            status: row.status,
            tier: row
                .tier
                .as_deref()
                .map(|tier| parse_column("tier", tier))
                .transpose()?,
            topic: row.topic,
            email: row.email,
            phone: row.phone,
            agent: row.agent,
            contract_type: row.contract_type,
            commission_pct: row.commission_pct,
            collaboration_start: row.collaboration_start,
            contract_signed_date: row.contract_signed_date,
            contract_end: row.contract_end,
            media_kit: row.media_kit,
            media_kit_updated: row.media_kit_updated,
            adv_category: row.adv_category,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `creator_platforms` table; `fees` is a JSONB object of fee key to amount.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorPlatformRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub platform: String,
    pub tier: Option<String>,
    pub fees: Json<BTreeMap<String, Decimal>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CreatorPlatformRow> for CreatorPlatform {
    type Error = DbError;

    fn try_from(row: CreatorPlatformRow) -> Result<Self, Self::Error> {
        Ok(CreatorPlatform {
            id: row.id,
            creator_id: row.creator_id,
            platform: row.platform,
            tier: row
                .tier
                .as_deref()
                .map(|tier| parse_column("tier", tier))
                .transpose()?,
            fees: row.fees.0,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// Escape `LIKE` wildcards so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_creator(pool: &PgPool, id: Uuid) -> Result<Option<CreatorRow>, DbError> {
    let row = sqlx::query_as::<_, CreatorRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM creators WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns creators matching `filter`, newest first. The search term is a
/// case-insensitive substring of the name or the full name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_creators(
    pool: &PgPool,
    filter: &CreatorFilter,
) -> Result<Vec<CreatorRow>, DbError> {
    let pattern = filter.search.as_deref().map(like_pattern);

    let rows = sqlx::query_as::<_, CreatorRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM creators \
          WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR full_name ILIKE $1) \
            AND ($2::TEXT IS NULL OR tier = $2) \
          ORDER BY created_at DESC, id"
    ))
    .bind(pattern)
    .bind(filter.tier.map(|t| t.as_str()))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_creator(pool: &PgPool, new: &NewCreator) -> Result<CreatorRow, DbError> {
    let row = sqlx::query_as::<_, CreatorRow>(concat!(
        "INSERT INTO creators (id, name, full_name, status, tier, topic, email, phone, agent, \
             contract_type, commission_pct, collaboration_start, contract_signed_date, \
             contract_end, media_kit, media_kit_updated, adv_category, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.full_name)
    .bind(&new.status)
    .bind(new.tier.map(|t| t.as_str()))
    .bind(&new.topic)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.agent)
    .bind(&new.contract_type)
    .bind(new.commission_pct)
    .bind(new.collaboration_start)
    .bind(new.contract_signed_date)
    .bind(new.contract_end)
    .bind(&new.media_kit)
    .bind(new.media_kit_updated)
    .bind(&new.adv_category)
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `patch` under a row lock and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no creator has `id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn update_creator(
    pool: &PgPool,
    id: Uuid,
    patch: CreatorPatch,
) -> Result<CreatorRow, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, CreatorRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM creators WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let mut creator = Creator::try_from(current)?;
    patch.apply(&mut creator);

    let row = sqlx::query_as::<_, CreatorRow>(concat!(
        "UPDATE creators SET \
             name = $2, full_name = $3, status = $4, tier = $5, topic = $6, email = $7, \
             phone = $8, agent = $9, contract_type = $10, commission_pct = $11, \
             collaboration_start = $12, contract_signed_date = $13, contract_end = $14, \
             media_kit = $15, media_kit_updated = $16, adv_category = $17, notes = $18, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(&creator.name)
    .bind(&creator.full_name)
    .bind(&creator.status)
    .bind(creator.tier.map(|t| t.as_str()))
    .bind(&creator.topic)
    .bind(&creator.email)
    .bind(&creator.phone)
    .bind(&creator.agent)
    .bind(&creator.contract_type)
    .bind(creator.commission_pct)
    .bind(creator.collaboration_start)
    .bind(creator.contract_signed_date)
    .bind(creator.contract_end)
    .bind(&creator.media_kit)
    .bind(creator.media_kit_updated)
    .bind(&creator.adv_category)
    .bind(&creator.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Deletes a creator with its platforms and participations (`ON DELETE CASCADE`).
/// Collaborations, revenue and payments hold the row with `ON DELETE RESTRICT`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no creator has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_creator(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM creators WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_creator_platforms(
    pool: &PgPool,
    creator_id: Uuid,
) -> Result<Vec<CreatorPlatformRow>, DbError> {
    let rows = sqlx::query_as::<_, CreatorPlatformRow>(concat!(
        "SELECT ",
        platform_columns!(),
        " FROM creator_platforms WHERE creator_id = $1 ORDER BY created_at, id"
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Swaps the creator's whole platform list in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a statement fails; nothing is written then.
pub async fn replace_creator_platforms(
    pool: &PgPool,
    creator_id: Uuid,
    platforms: &[NewCreatorPlatform],
) -> Result<Vec<CreatorPlatformRow>, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM creator_platforms WHERE creator_id = $1")
        .bind(creator_id)
        .execute(&mut *tx)
        .await?;

    let mut rows = Vec::with_capacity(platforms.len());
    for platform in platforms {
        let row = sqlx::query_as::<_, CreatorPlatformRow>(concat!(
            "INSERT INTO creator_platforms (id, creator_id, platform, tier, fees, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING ",
            platform_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(creator_id)
        .bind(&platform.platform)
        .bind(platform.tier.map(|t| t.as_str()))
        .bind(Json(&platform.fees))
        .bind(&platform.notes)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    Ok(rows)
}
