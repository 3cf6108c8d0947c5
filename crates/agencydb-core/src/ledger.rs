//! Manual ledger writes and revenue reporting.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::revenue::{NewRevenueEntry, RevenueEntry, RevenueFilter, RevenuePatch, YearMonth};
use crate::creators::ensure_creator;
use crate::store::{CreatorStore, RevenueStore};
use crate::CrmError;

/// Write the manual figure for a creator/month.
///
/// There is one manual row per creator and month: an existing one is
/// overwritten, otherwise a row is inserted. Synced rows are never touched.
///
/// # Errors
///
/// Returns [`CrmError::Validation`] for a negative amount or an unknown
/// creator, or the store error.
pub async fn record_manual_revenue<S>(
    store: &S,
    mut entry: NewRevenueEntry,
) -> Result<RevenueEntry, CrmError>
where
    S: RevenueStore + CreatorStore + ?Sized,
{
    if entry.amount < Decimal::ZERO {
        return Err(CrmError::Validation(format!(
            "amount must not be negative, got {}",
            entry.amount
        )));
    }
    ensure_creator(store, entry.creator_id).await?;
    entry.source_collaboration_id = None;

    let existing = store
        .find_revenue(&RevenueFilter::manual(entry.creator_id, entry.month))
        .await?;
    if let Some(current) = existing.first() {
        let updated = store
            .update_revenue(
                current.id,
                RevenuePatch {
                    amount: Some(entry.amount),
                    invoiced: Some(entry.invoiced),
                    notes: Some(entry.notes),
                    ..RevenuePatch::default()
                },
            )
            .await?;
        tracing::info!(
            revenue_id = %updated.id,
            creator_id = %updated.creator_id,
            month = %updated.month,
            "manual revenue updated"
        );
        return Ok(updated);
    }

    let created = store.insert_revenue(entry).await?;
    tracing::info!(
        revenue_id = %created.id,
        creator_id = %created.creator_id,
        month = %created.month,
        "manual revenue recorded"
    );
    Ok(created)
}

/// # Errors
///
/// Returns [`CrmError::NotFound`] if the row does not exist, or the store error.
pub async fn delete_revenue<S>(store: &S, id: Uuid) -> Result<(), CrmError>
where
    S: RevenueStore + ?Sized,
{
    let entry = store.get_revenue(id).await?;
    if let Some(collaboration_id) = entry.source_collaboration_id {
        // The next sync of that collaboration recreates it.
        tracing::warn!(revenue_id = %id, %collaboration_id, "deleting a synced revenue row");
    }
    store.delete_revenue(id).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: YearMonth,
    pub total: Decimal,
}

/// Ledger totals per month, ascending. Months with no rows are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyTotals {
    pub months: Vec<MonthTotal>,
}

impl MonthlyTotals {
    #[must_use]
    pub fn from_entries(entries: &[RevenueEntry]) -> Self {
        let mut sums: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
        for entry in entries {
            *sums.entry(entry.month).or_default() += entry.amount;
        }
        Self {
            months: sums
                .into_iter()
                .map(|(month, total)| MonthTotal { month, total })
                .collect(),
        }
    }

    #[must_use]
    pub fn total_for(&self, month: YearMonth) -> Decimal {
        self.months
            .iter()
            .find(|m| m.month == month)
            .map_or(Decimal::ZERO, |m| m.total)
    }

    /// The `count` months ending at `current`, oldest first, zero-filled.
    #[must_use]
    pub fn recent_months(&self, current: YearMonth, count: usize) -> Vec<MonthTotal> {
        let mut months = Vec::with_capacity(count);
        let mut month = current;
        for _ in 0..count {
            months.push(MonthTotal {
                month,
                total: self.total_for(month),
            });
            month = month.previous();
        }
        months.reverse();
        months
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatorTotal {
    pub creator_id: Uuid,
    pub total: Decimal,
}

/// Creators ranked by total revenue, highest first; ties by creator id.
#[must_use]
pub fn top_creators(entries: &[RevenueEntry], limit: usize) -> Vec<CreatorTotal> {
    let mut sums: HashMap<Uuid, Decimal> = HashMap::new();
    for entry in entries {
        *sums.entry(entry.creator_id).or_default() += entry.amount;
    }
    let mut ranked: Vec<CreatorTotal> = sums
        .into_iter()
        .map(|(creator_id, total)| CreatorTotal { creator_id, total })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.creator_id.cmp(&b.creator_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{create_creator, InMemoryStore, NewCreator};

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    async fn registered_creator(store: &InMemoryStore) -> Uuid {
        create_creator(store, NewCreator::named("Nova"))
            .await
            .unwrap()
            .id
    }

    fn manual(creator_id: Uuid, month: YearMonth, amount: i64) -> NewRevenueEntry {
        NewRevenueEntry {
            creator_id,
            month,
            amount: Decimal::new(amount, 0),
            invoiced: false,
            notes: None,
            source_collaboration_id: None,
        }
    }

    fn entry(creator_id: Uuid, month: YearMonth, amount: i64) -> RevenueEntry {
        let now = Utc::now();
        RevenueEntry {
            id: Uuid::new_v4(),
            creator_id,
            month,
            amount: Decimal::new(amount, 0),
            invoiced: false,
            notes: None,
            source_collaboration_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn manual_upsert_keeps_one_row_per_creator_month() {
        let store = InMemoryStore::new();
        let creator = registered_creator(&store).await;

        let first = record_manual_revenue(&store, manual(creator, ym(2024, 3), 200))
            .await
            .unwrap();
        let mut again = manual(creator, ym(2024, 3), 450);
        again.invoiced = true;
        let second = record_manual_revenue(&store, again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.amount, Decimal::new(450, 0));
        assert!(second.invoiced);
        let rows = store
            .find_revenue(&RevenueFilter::manual(creator, ym(2024, 3)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn manual_upsert_ignores_synced_rows() {
        let store = InMemoryStore::new();
        let creator = registered_creator(&store).await;
        let mut synced = manual(creator, ym(2024, 3), 300);
        synced.source_collaboration_id = Some(Uuid::new_v4());
        let synced = store.insert_revenue(synced).await.unwrap();

        let manual_row = record_manual_revenue(&store, manual(creator, ym(2024, 3), 200))
            .await
            .unwrap();

        assert_ne!(manual_row.id, synced.id);
        assert_eq!(
            store.get_revenue(synced.id).await.unwrap().amount,
            Decimal::new(300, 0)
        );
    }

    #[tokio::test]
    async fn negative_manual_amount_is_rejected() {
        let store = InMemoryStore::new();
        let err = record_manual_revenue(&store, manual(Uuid::new_v4(), ym(2024, 3), -5))
            .await
            .unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
    }

    #[tokio::test]
    async fn manual_revenue_for_unknown_creator_is_rejected() {
        let store = InMemoryStore::new();
        let err = record_manual_revenue(&store, manual(Uuid::new_v4(), ym(2024, 3), 200))
            .await
            .unwrap_err();
        assert!(matches!(err, CrmError::Validation(m) if m.contains("unknown creator")));
        assert!(store
            .find_revenue(&RevenueFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_row_is_not_found() {
        let store = InMemoryStore::new();
        let err = delete_revenue(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn monthly_totals_sum_and_zero_fill_recent_months() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let totals = MonthlyTotals::from_entries(&[
            entry(a, ym(2024, 11), 100),
            entry(b, ym(2024, 11), 50),
            entry(a, ym(2025, 1), 70),
        ]);

        assert_eq!(totals.months.len(), 2);
        assert_eq!(totals.total_for(ym(2024, 11)), Decimal::new(150, 0));

        let recent = totals.recent_months(ym(2025, 1), 3);
        let months: Vec<_> = recent.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01"]);
        assert_eq!(recent[1].total, Decimal::ZERO);
        assert_eq!(recent[2].total, Decimal::new(70, 0));
    }

    #[test]
    fn top_creators_rank_by_total() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let ranked = top_creators(
            &[
                entry(a, ym(2024, 1), 100),
                entry(b, ym(2024, 1), 400),
                entry(a, ym(2024, 2), 350),
                entry(c, ym(2024, 2), 10),
            ],
            2,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].creator_id, a);
        assert_eq!(ranked[0].total, Decimal::new(450, 0));
        assert_eq!(ranked[1].creator_id, b);
    }
}
