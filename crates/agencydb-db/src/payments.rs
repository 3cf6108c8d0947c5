//! Database operations for the `payments` table.

use agencydb_core::{NewPayment, PaymentFilter, PaymentPatch, PaymentRecord, YearMonth};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

macro_rules! columns {
    () => {
        "id, creator_id, month, payment_type, amount_paid, invoice_number, invoice_date, \
         invoice_link, verified, notes, created_at, updated_at"
    };
}

/// A row from the `payments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub month: NaiveDate,
    pub payment_type: Option<String>,
    pub amount_paid: Decimal,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_link: Option<String>,
    pub verified: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for PaymentRecord {
    fn from(row: PaymentRow) -> Self {
        PaymentRecord {
            id: row.id,
            creator_id: row.creator_id,
            month: YearMonth::from(row.month),
            payment_type: row.payment_type,
            amount_paid: row.amount_paid,
            invoice_number: row.invoice_number,
            invoice_date: row.invoice_date,
            invoice_link: row.invoice_link,
            verified: row.verified,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_payment(pool: &PgPool, id: Uuid) -> Result<Option<PaymentRow>, DbError> {
    let row = sqlx::query_as::<_, PaymentRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM payments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns payments matching `filter`, latest month first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_payments(
    pool: &PgPool,
    filter: &PaymentFilter,
) -> Result<Vec<PaymentRow>, DbError> {
    let rows = sqlx::query_as::<_, PaymentRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM payments \
          WHERE ($1::UUID IS NULL OR creator_id = $1) \
            AND ($2::DATE IS NULL OR month = $2) \
          ORDER BY month DESC, created_at, id"
    ))
    .bind(filter.creator_id)
    .bind(filter.month.map(YearMonth::first_day))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_payment(pool: &PgPool, new: &NewPayment) -> Result<PaymentRow, DbError> {
    let row = sqlx::query_as::<_, PaymentRow>(concat!(
        "INSERT INTO payments (id, creator_id, month, payment_type, amount_paid, \
             invoice_number, invoice_date, invoice_link, verified, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(new.creator_id)
    .bind(new.month.first_day())
    .bind(&new.payment_type)
    .bind(new.amount_paid)
    .bind(&new.invoice_number)
    .bind(new.invoice_date)
    .bind(&new.invoice_link)
    .bind(new.verified)
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no payment has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_payment(
    pool: &PgPool,
    id: Uuid,
    patch: PaymentPatch,
) -> Result<PaymentRow, DbError> {
    let row = sqlx::query_as::<_, PaymentRow>(concat!(
        "UPDATE payments SET verified = COALESCE($2, verified), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(patch.verified)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no payment has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_payment(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
