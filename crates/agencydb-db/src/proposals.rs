//! Database operations for the `proposals` table.

use agencydb_core::{NewProposal, Proposal, ProposalFilter, ProposalPatch, ProposalStage};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{parse_column, DbError};

macro_rules! columns {
    () => {
        "id, brand_name, sector, target_demographic, contact_email, phone, website, agent, \
         priority, notes, suggested_creators, referrer, contact_date, last_action_date, stage, \
         linked_brand_id, created_at, updated_at"
    };
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `proposals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProposalRow {
    pub id: Uuid,
    pub brand_name: String,
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
    pub last_action_date: Option<NaiveDate>,
    pub stage: String,
    pub linked_brand_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = DbError;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        Ok(Proposal {
            id: row.id,
            brand_name: row.brand_name,
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
            last_action_date: row.last_action_date,
            stage: parse_column("stage", &row.stage)?,
            linked_brand_id: row.linked_brand_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns one proposal by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_proposal(pool: &PgPool, id: Uuid) -> Result<Option<ProposalRow>, DbError> {
    let row = sqlx::query_as::<_, ProposalRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM proposals WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns proposals matching `filter`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_proposals(
    pool: &PgPool,
    filter: &ProposalFilter,
) -> Result<Vec<ProposalRow>, DbError> {
    let rows = sqlx::query_as::<_, ProposalRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM proposals \
          WHERE ($1::TEXT IS NULL OR stage = $1) \
            AND ($2::TEXT IS NULL OR agent = $2) \
          ORDER BY created_at DESC, id"
    ))
    .bind(filter.stage.map(ProposalStage::as_str))
    .bind(filter.agent.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a proposal. The stage defaults to `TO_CONTACT`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_proposal(pool: &PgPool, new: &NewProposal) -> Result<ProposalRow, DbError> {
    let row = sqlx::query_as::<_, ProposalRow>(concat!(
        "INSERT INTO proposals (id, brand_name, sector, target_demographic, contact_email, \
             phone, website, agent, priority, notes, suggested_creators, referrer, \
             contact_date, last_action_date, stage) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING ",
        columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(&new.brand_name)
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
    .bind(new.last_action_date)
    .bind(new.stage.unwrap_or(ProposalStage::ToContact).as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies `patch` to a proposal under a row lock and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no proposal has `id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn update_proposal(
    pool: &PgPool,
    id: Uuid,
    patch: ProposalPatch,
) -> Result<ProposalRow, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, ProposalRow>(concat!(
        "SELECT ",
        columns!(),
        " FROM proposals WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let mut proposal = Proposal::try_from(current)?;
    patch.apply(&mut proposal);

    let row = sqlx::query_as::<_, ProposalRow>(concat!(
        "UPDATE proposals SET \
             brand_name = $2, sector = $3, target_demographic = $4, contact_email = $5, \
             phone = $6, website = $7, agent = $8, priority = $9, notes = $10, \
             suggested_creators = $11, referrer = $12, contact_date = $13, \
             last_action_date = $14, stage = $15, linked_brand_id = $16, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        columns!()
    ))
    .bind(id)
    .bind(&proposal.brand_name)
    .bind(&proposal.sector)
    .bind(&proposal.target_demographic)
    .bind(&proposal.contact_email)
    .bind(&proposal.phone)
    .bind(&proposal.website)
    .bind(&proposal.agent)
    .bind(proposal.priority.as_str())
    .bind(&proposal.notes)
    .bind(&proposal.suggested_creators)
    .bind(&proposal.referrer)
    .bind(proposal.contact_date)
    .bind(proposal.last_action_date)
    .bind(proposal.stage.as_str())
    .bind(proposal.linked_brand_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no proposal has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_proposal(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
