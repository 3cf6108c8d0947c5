//! Derives ledger rows from completed, paid collaborations.
//!
//! Each collaboration owns at most one revenue row, tagged with
//! `source_collaboration_id`. The sync is a lookup followed by an upsert or
//! delete; the two steps are not atomic, and re-running converges.

use serde::Serialize;
use uuid::Uuid;

use crate::collaborations::{Collaboration, CollaborationFilter};
use crate::revenue::{NewRevenueEntry, RevenueEntry, RevenueFilter, RevenuePatch, YearMonth};
use crate::store::{CollaborationStore, RevenueStore};
use crate::CrmError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "entry", rename_all = "snake_case")]
pub enum SyncOutcome {
    Created(RevenueEntry),
    Updated(RevenueEntry),
    /// Id of the ledger row deleted because the collaboration left the
    /// completed-and-paid state.
    Removed(Uuid),
    Unchanged,
}

/// Writes needed to bring the owned rows in line with a collaboration.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPlan {
    Insert(NewRevenueEntry),
    Update { id: Uuid, patch: RevenuePatch },
    /// The owned row already matches.
    Keep(Uuid),
    Remove(Vec<Uuid>),
    Nothing,
}

/// Plan the sync without touching the store.
///
/// `owned` are the rows whose `source_collaboration_id` is the
/// collaboration's id. Rows past the first are returned separately so the
/// caller deletes them.
///
/// # Errors
///
/// Returns [`CrmError::MissingData`] when the collaboration is completed and
/// paid but has no contract signed date.
pub fn plan_sync(
    collaboration: &Collaboration,
    owned: &[RevenueEntry],
) -> Result<(SyncPlan, Vec<Uuid>), CrmError> {
    if !collaboration.is_revenue_eligible() {
        let plan = if owned.is_empty() {
            SyncPlan::Nothing
        } else {
            SyncPlan::Remove(owned.iter().map(|e| e.id).collect())
        };
        return Ok((plan, Vec::new()));
    }

    let signed = collaboration
        .contract_signed_date
        .ok_or(CrmError::MissingData {
            entity: "collaboration",
            id: collaboration.id,
            field: "contract_signed_date",
        })?;
    let month = YearMonth::from(signed);

    let Some((existing, extra)) = owned.split_first() else {
        return Ok((
            SyncPlan::Insert(NewRevenueEntry {
                creator_id: collaboration.creator_id,
                month,
                amount: collaboration.payment_amount,
                invoiced: false,
                notes: None,
                source_collaboration_id: Some(collaboration.id),
            }),
            Vec::new(),
        ));
    };
    let duplicates = extra.iter().map(|e| e.id).collect();

    if existing.month == month
        && existing.amount == collaboration.payment_amount
        && existing.creator_id == collaboration.creator_id
    {
        return Ok((SyncPlan::Keep(existing.id), duplicates));
    }

    let patch = RevenuePatch {
        creator_id: Some(collaboration.creator_id),
        month: Some(month),
        amount: Some(collaboration.payment_amount),
        ..RevenuePatch::default()
    };
    Ok((
        SyncPlan::Update {
            id: existing.id,
            patch,
        },
        duplicates,
    ))
}

/// Bring the ledger in line with `collaboration`.
///
/// # Errors
///
/// Returns [`CrmError::MissingData`] when the collaboration is completed and
/// paid but has no contract signed date, or the store error.
pub async fn sync_from_collaboration<S>(
    store: &S,
    collaboration: &Collaboration,
) -> Result<SyncOutcome, CrmError>
where
    S: RevenueStore + ?Sized,
{
    let owned = store
        .find_revenue(&RevenueFilter::owned_by(collaboration.id))
        .await?;
    let (plan, duplicates) = plan_sync(collaboration, &owned)?;

    for id in duplicates {
        tracing::warn!(
            collaboration_id = %collaboration.id,
            revenue_id = %id,
            "deleting duplicate synced revenue row"
        );
        store.delete_revenue(id).await?;
    }

    match plan {
        SyncPlan::Nothing | SyncPlan::Keep(_) => Ok(SyncOutcome::Unchanged),
        SyncPlan::Remove(ids) => {
            for id in &ids {
                store.delete_revenue(*id).await?;
            }
            tracing::info!(
                collaboration_id = %collaboration.id,
                status = %collaboration.status,
                is_paid = collaboration.is_paid,
                "synced revenue row removed"
            );
            Ok(ids
                .first()
                .copied()
                .map_or(SyncOutcome::Unchanged, SyncOutcome::Removed))
        }
        SyncPlan::Insert(new) => {
            let entry = store.insert_revenue(new).await?;
            tracing::info!(
                collaboration_id = %collaboration.id,
                revenue_id = %entry.id,
                month = %entry.month,
                "synced revenue row created"
            );
            Ok(SyncOutcome::Created(entry))
        }
        SyncPlan::Update { id, patch } => {
            let entry = store.update_revenue(id, patch).await?;
            tracing::info!(
                collaboration_id = %collaboration.id,
                revenue_id = %entry.id,
                month = %entry.month,
                "synced revenue row updated"
            );
            Ok(SyncOutcome::Updated(entry))
        }
    }
}

/// Counts from a [`resync_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    pub dry_run: bool,
    pub scanned: usize,
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub failures: Vec<ResyncFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResyncFailure {
    pub collaboration_id: Uuid,
    pub reason: String,
}

impl ResyncReport {
    fn record(&mut self, plan: &SyncPlan) {
        match plan {
            SyncPlan::Insert(_) => self.created += 1,
            SyncPlan::Update { .. } => self.updated += 1,
            SyncPlan::Remove(_) => self.removed += 1,
            SyncPlan::Keep(_) | SyncPlan::Nothing => self.unchanged += 1,
        }
    }

    fn record_outcome(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Created(_) => self.created += 1,
            SyncOutcome::Updated(_) => self.updated += 1,
            SyncOutcome::Removed(_) => self.removed += 1,
            SyncOutcome::Unchanged => self.unchanged += 1,
        }
    }

    fn fail(&mut self, collaboration_id: Uuid, error: &CrmError) {
        tracing::warn!(%collaboration_id, error = %error, "resync failed");
        self.failures.push(ResyncFailure {
            collaboration_id,
            reason: error.to_string(),
        });
    }
}

/// Re-run the synchronizer for every collaboration.
///
/// Repairs ledgers left behind by a crash between a collaboration write and
/// its sync. A failure on one collaboration is recorded and the pass goes on.
/// With `dry_run` the planned writes are counted but not performed.
///
/// # Errors
///
/// Returns the store error only if the collaboration list cannot be read.
pub async fn resync_all<S>(store: &S, dry_run: bool) -> Result<ResyncReport, CrmError>
where
    S: CollaborationStore + RevenueStore + ?Sized,
{
    let collaborations = store
        .find_collaborations(&CollaborationFilter::default())
        .await?;
    let mut report = ResyncReport {
        dry_run,
        scanned: collaborations.len(),
        ..ResyncReport::default()
    };

    for collaboration in &collaborations {
        if dry_run {
            let planned = match store
                .find_revenue(&RevenueFilter::owned_by(collaboration.id))
                .await
            {
                Ok(owned) => plan_sync(collaboration, &owned),
                Err(e) => Err(e),
            };
            match planned {
                Ok((plan, _)) => report.record(&plan),
                Err(e) => report.fail(collaboration.id, &e),
            }
        } else {
            match sync_from_collaboration(store, collaboration).await {
                Ok(outcome) => report.record_outcome(&outcome),
                Err(e) => report.fail(collaboration.id, &e),
            }
        }
    }

    tracing::info!(
        dry_run,
        scanned = report.scanned,
        created = report.created,
        updated = report.updated,
        removed = report.removed,
        failures = report.failures.len(),
        "revenue resync finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "revenue_sync_test.rs"]
mod tests;
