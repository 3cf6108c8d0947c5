//! Database operations for the `brands` table.

use agencydb_core::{Brand, BrandFilter, BrandPatch, NewBrand};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{parse_column, DbError};

macro_rules! columns {
    () => {
        "id, name, sector, target_demographic, contact_email, phone, website, agent, priority, \
         notes, suggested_creators, referrer, contact_date, status, origin_proposal_id, \
         created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: Uuid,
    pub name: String,
    pub sector: Option<String>,
    pub target_demographic: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub agent: Option<String>,
    pub priority: String,
    pub notes: Option<String>,
    pub suggested_creators: Option<String>,
    pub referrer: Option<String>,
    pub contact_date: Option<NaiveDate>,
    pub status: String,
    pub origin_proposal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BrandRow> for Brand {
    type Error = DbError;

    fn try_from(row: BrandRow) -> Result<Self, Self::Error> {
        Ok(Brand {
            id: row.id,
            name: row.name,
            sector: row.sector,
            target_demographic: row.target_demographic,
            contact_email: row.contact_email,
            phone: row.phone,
            website: row.website,
            agent: row.agent,
            priority: parse_column("priority", &row.priority)?,
            notes: row.notes,
            suggested_creators: row.suggested_creators,
            referrer: row.referrer,
            contact_date: row.contact_date,
            status: parse_column("status", &row.status)?,
            origin_proposal_id: row.origin_proposal_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns one brand by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand(pool: &PgPool, id: Uuid) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM brands WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns brands matching `filter`, ordered by name. The name match is
/// exact and case-sensitive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_brands(pool: &PgPool, filter: &BrandFilter) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM brands \
          WHERE ($1::TEXT IS NULL OR name = $1) \
          ORDER BY name, created_at"
    ))
    .bind(filter.name.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_brand(pool: &PgPool, new: &NewBrand) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(concat!(
        "INSERT INTO brands (id, name, sector, target_demographic, contact_email, phone, \
             website, agent, priority, notes, suggested_creators, referrer, contact_date, \
             status, origin_proposal_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.sector)
    .bind(&new.target_demographic)
    .bind(&new.contact_email)
    .bind(&new.phone)
    .bind(&new.website)
    .bind(&new.agent)
    .bind(new.priority.as_str())
    .bind(&new.notes)
    .bind(&new.suggested_creators)
    .bind(&new.referrer)
    .bind(new.contact_date)
    .bind(new.status.as_str())
    .bind(new.origin_proposal_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates status, priority, agent and notes; absent fields keep their value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_brand(pool: &PgPool, id: Uuid, patch: &BrandPatch) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(concat!(
        "UPDATE brands SET \
             status = COALESCE($2, status), \
             priority = COALESCE($3, priority), \
             agent = COALESCE($4, agent), \
             notes = COALESCE($5, notes), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(patch.priority.map(|p| p.as_str()))
    .bind(patch.agent.as_deref())
    .bind(patch.notes.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_brand(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
