//! Database operations for the `revenue_entries` table.

use agencydb_core::{NewRevenueEntry, RevenueEntry, RevenueFilter, RevenuePatch, YearMonth};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

macro_rules! columns {
    () => {
        "id, creator_id, month, amount, invoiced, notes, source_collaboration_id, \
         created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `revenue_entries` table. `month` is the first day of the month.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RevenueRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub month: NaiveDate,
    pub amount: Decimal,
    pub invoiced: bool,
    pub notes: Option<String>,
    pub source_collaboration_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RevenueRow> for RevenueEntry {
    fn from(row: RevenueRow) -> Self {
        RevenueEntry {
            id: row.id,
            creator_id: row.creator_id,
            month: YearMonth::from(row.month),
            amount: row.amount,
            invoiced: row.invoiced,
            notes: row.notes,
            source_collaboration_id: row.source_collaboration_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_revenue(pool: &PgPool, id: Uuid) -> Result<Option<RevenueRow>, DbError> {
    let row = sqlx::query_as::<_, RevenueRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM revenue_entries WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns ledger rows matching `filter`, ordered by month then creation time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_revenue(
    pool: &PgPool,
    filter: &RevenueFilter,
) -> Result<Vec<RevenueRow>, DbError> {
    let rows = sqlx::query_as::<_, RevenueRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM revenue_entries \
          WHERE ($1::UUID IS NULL OR creator_id = $1) \
            AND ($2::DATE IS NULL OR month = $2) \
            AND ($3::UUID IS NULL OR source_collaboration_id = $3) \
            AND (NOT $4 OR source_collaboration_id IS NULL) \
          ORDER BY month, created_at, id"
    ))
    .bind(filter.creator_id)
    .bind(filter.month.map(YearMonth::first_day))
    .bind(filter.source_collaboration_id)
    .bind(filter.manual_only)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a second synced
/// row for the same collaboration.
pub async fn insert_revenue(pool: &PgPool, new: &NewRevenueEntry) -> Result<RevenueRow, DbError> {
    let row = sqlx::query_as::<_, RevenueRow>(concat!(
        "INSERT INTO revenue_entries (id, creator_id, month, amount, invoiced, notes, \
             source_collaboration_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(new.creator_id)
    .bind(new.month.first_day())
    .bind(new.amount)
    .bind(new.invoiced)
    .bind(&new.notes)
    .bind(new.source_collaboration_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Sparse update. `notes` is only touched when the patch carries it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_revenue(
    pool: &PgPool,
    id: Uuid,
    patch: &RevenuePatch,
) -> Result<RevenueRow, DbError> {
    let (set_notes, notes) = match &patch.notes {
        Some(notes) => (true, notes.as_deref()),
        None => (false, None),
    };

    let row = sqlx::query_as::<_, RevenueRow>(concat!(
        "UPDATE revenue_entries SET \
             creator_id = COALESCE($2, creator_id), \
             month = COALESCE($3, month), \
             amount = COALESCE($4, amount), \
             invoiced = COALESCE($5, invoiced), \
             notes = CASE WHEN $6::BOOL THEN $7 ELSE notes END, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(patch.creator_id)
    .bind(patch.month.map(YearMonth::first_day))
    .bind(patch.amount)
    .bind(patch.invoiced)
    .bind(set_notes)
    .bind(notes)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_revenue(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM revenue_entries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
