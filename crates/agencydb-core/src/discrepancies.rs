//! Reconciliation: creator/months holding both manual and synced revenue.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::revenue::{RevenueEntry, RevenueFilter, YearMonth};
use crate::store::RevenueStore;
use crate::CrmError;

/// A creator/month whose revenue is likely counted twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub creator_id: Uuid,
    pub month: YearMonth,
    pub auto_total: Decimal,
    pub manual_total: Decimal,
}

/// Group `entries` by creator and month and keep the groups where both the
/// synced and the manual totals are positive. Ordered by month, then creator.
#[must_use]
pub fn detect_discrepancies(entries: &[RevenueEntry]) -> Vec<Discrepancy> {
    let mut groups: BTreeMap<(YearMonth, Uuid), (Decimal, Decimal)> = BTreeMap::new();
    for entry in entries {
        let (auto, manual) = groups
            .entry((entry.month, entry.creator_id))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if entry.is_auto() {
            *auto += entry.amount;
        } else {
            *manual += entry.amount;
        }
    }

    groups
        .into_iter()
        .filter(|(_, (auto, manual))| *auto > Decimal::ZERO && *manual > Decimal::ZERO)
        .map(|((month, creator_id), (auto_total, manual_total))| Discrepancy {
            creator_id,
            month,
            auto_total,
            manual_total,
        })
        .collect()
}

/// Read-only scan of the whole ledger.
///
/// # Errors
///
/// Returns the store error if the ledger cannot be read.
pub async fn find_discrepancies<S>(store: &S) -> Result<Vec<Discrepancy>, CrmError>
where
    S: RevenueStore + ?Sized,
{
    let entries = store.find_revenue(&RevenueFilter::default()).await?;
    let found = detect_discrepancies(&entries);
    tracing::debug!(
        rows = entries.len(),
        discrepancies = found.len(),
        "ledger reconciliation scanned"
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::revenue::NewRevenueEntry;
    use crate::InMemoryStore;

    fn march() -> YearMonth {
        YearMonth::new(2024, 3).unwrap()
    }

    fn row(creator_id: Uuid, month: YearMonth, amount: i64, source: Option<Uuid>) -> RevenueEntry {
        let now = Utc::now();
        RevenueEntry {
            id: Uuid::new_v4(),
            creator_id,
            month,
            amount: Decimal::new(amount, 0),
            invoiced: false,
            notes: None,
            source_collaboration_id: source,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn manual_and_synced_in_same_month_is_flagged() {
        let creator = Uuid::new_v4();
        let rows = vec![
            row(creator, march(), 200, None),
            row(creator, march(), 300, Some(Uuid::new_v4())),
        ];

        let found = detect_discrepancies(&rows);
        assert_eq!(
            found,
            vec![Discrepancy {
                creator_id: creator,
                month: march(),
                auto_total: Decimal::new(300, 0),
                manual_total: Decimal::new(200, 0),
            }]
        );
    }

    #[test]
    fn removing_either_side_clears_the_discrepancy() {
        let creator = Uuid::new_v4();
        let manual = row(creator, march(), 200, None);
        let synced = row(creator, march(), 300, Some(Uuid::new_v4()));

        assert!(detect_discrepancies(&[manual]).is_empty());
        assert!(detect_discrepancies(&[synced]).is_empty());
    }

    #[test]
    fn different_months_or_creators_do_not_collide() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let april = YearMonth::new(2024, 4).unwrap();
        let rows = vec![
            row(a, march(), 200, None),
            row(a, april, 300, Some(Uuid::new_v4())),
            row(b, march(), 300, Some(Uuid::new_v4())),
        ];
        assert!(detect_discrepancies(&rows).is_empty());
    }

    #[test]
    fn zero_amount_rows_do_not_count() {
        let creator = Uuid::new_v4();
        let rows = vec![
            row(creator, march(), 0, None),
            row(creator, march(), 300, Some(Uuid::new_v4())),
        ];
        assert!(detect_discrepancies(&rows).is_empty());
    }

    #[test]
    fn totals_sum_every_row_in_the_bucket_and_sort_by_month() {
        let creator = Uuid::new_v4();
        let feb = YearMonth::new(2024, 2).unwrap();
        let rows = vec![
            row(creator, march(), 100, None),
            row(creator, march(), 50, None),
            row(creator, march(), 300, Some(Uuid::new_v4())),
            row(creator, march(), 20, Some(Uuid::new_v4())),
            row(creator, feb, 10, None),
            row(creator, feb, 10, Some(Uuid::new_v4())),
        ];

        let found = detect_discrepancies(&rows);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].month, feb);
        assert_eq!(found[1].auto_total, Decimal::new(320, 0));
        assert_eq!(found[1].manual_total, Decimal::new(150, 0));
    }

    #[tokio::test]
    async fn scan_reads_the_store() {
        let store = InMemoryStore::new();
        let creator = Uuid::new_v4();
        store
            .insert_revenue(NewRevenueEntry {
                creator_id: creator,
                month: march(),
                amount: Decimal::new(200, 0),
                invoiced: false,
                notes: None,
                source_collaboration_id: None,
            })
            .await
            .unwrap();
        let synced = store
            .insert_revenue(NewRevenueEntry {
                creator_id: creator,
                month: march(),
                amount: Decimal::new(300, 0),
                invoiced: false,
                notes: None,
                source_collaboration_id: Some(Uuid::new_v4()),
            })
            .await
            .unwrap();

        assert_eq!(find_discrepancies(&store).await.unwrap().len(), 1);

        store.delete_revenue(synced.id).await.unwrap();
        assert!(find_discrepancies(&store).await.unwrap().is_empty());
    }
}
