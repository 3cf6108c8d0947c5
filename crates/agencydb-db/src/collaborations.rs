//! Database operations for the `collaborations` table.

use agencydb_core::{Collaboration, CollaborationFilter, CollaborationPatch, NewCollaboration};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{parse_column, DbError};

macro_rules! columns {
    () => {
        "id, creator_id, brand_name, status, is_paid, payment_amount, management_fee, \
         contract_signed_date, publication_date, agent, notes, created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `collaborations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollaborationRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub brand_name: String,
    pub status: String,
    pub is_paid: bool,
    pub payment_amount: Decimal,
    pub management_fee: Option<Decimal>,
    pub contract_signed_date: Option<NaiveDate>,
    pub publication_date: Option<NaiveDate>,
    pub agent: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CollaborationRow> for Collaboration {
    type Error = DbError;

    fn try_from(row: CollaborationRow) -> Result<Self, Self::Error> {
        Ok(Collaboration {
            id: row.id,
            creator_id: row.creator_id,
            brand_name: row.brand_name,
            status: parse_column("status", &row.status)?,
            is_paid: row.is_paid,
            payment_amount: row.payment_amount,
            management_fee: row.management_fee,
            contract_signed_date: row.contract_signed_date,
            publication_date: row.publication_date,
            agent: row.agent,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_collaboration(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CollaborationRow>, DbError> {
    let row = sqlx::query_as::<_, CollaborationRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM collaborations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns collaborations matching `filter`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_collaborations(
    pool: &PgPool,
    filter: &CollaborationFilter,
) -> Result<Vec<CollaborationRow>, DbError> {
    let rows = sqlx::query_as::<_, CollaborationRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM collaborations \
          WHERE ($1::UUID IS NULL OR creator_id = $1) \
            AND ($2::TEXT IS NULL OR brand_name = $2) \
          ORDER BY created_at DESC, id"
    ))
    .bind(filter.creator_id)
    .bind(filter.brand_name.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_collaboration(
    pool: &PgPool,
    new: &NewCollaboration,
) -> Result<CollaborationRow, DbError> {
    let row = sqlx::query_as::<_, CollaborationRow>(concat!(
        "INSERT INTO collaborations (id, creator_id, brand_name, status, is_paid, \
             payment_amount, management_fee, contract_signed_date, publication_date, agent, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(new.creator_id)
    .bind(&new.brand_name)
    .bind(new.status.as_str())
    .bind(new.is_paid)
    .bind(new.payment_amount)
    .bind(new.management_fee)
    .bind(new.contract_signed_date)
    .bind(new.publication_date)
    .bind(&new.agent)
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `patch` under a row lock and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no collaboration has `id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn update_collaboration(
    pool: &PgPool,
    id: Uuid,
    patch: CollaborationPatch,
) -> Result<CollaborationRow, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, CollaborationRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM collaborations WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let mut collaboration = Collaboration::try_from(current)?;
    patch.apply(&mut collaboration);

    let row = sqlx::query_as::<_, CollaborationRow>(concat!(
        "UPDATE collaborations SET \
             brand_name = $2, status = $3, is_paid = $4, payment_amount = $5, \
             management_fee = $6, contract_signed_date = $7, publication_date = $8, \
             agent = $9, notes = $10, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(&collaboration.brand_name)
    .bind(collaboration.status.as_str())
    .bind(collaboration.is_paid)
    .bind(collaboration.payment_amount)
    .bind(collaboration.management_fee)
    .bind(collaboration.contract_signed_date)
    .bind(collaboration.publication_date)
    .bind(&collaboration.agent)
    .bind(&collaboration.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Deletes a collaboration; its synced revenue row goes with it (`ON DELETE CASCADE`).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no collaboration has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_collaboration(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM collaborations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
