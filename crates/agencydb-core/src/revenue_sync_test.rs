use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;
use crate::collaborations::{
    create_collaboration, update_collaboration, CollaborationPatch, CollaborationStatus,
    NewCollaboration,
};
use crate::InMemoryStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ym(y: i32, m: u32) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

fn completed_paid(creator_id: Uuid, amount: i64, signed: NaiveDate) -> NewCollaboration {
    NewCollaboration {
        status: CollaborationStatus::Completed,
        is_paid: true,
        payment_amount: Decimal::new(amount, 0),
        contract_signed_date: Some(signed),
        ..NewCollaboration::new(creator_id, "Acme")
    }
}

async fn store_with_creator() -> (InMemoryStore, Uuid) {
    let store = InMemoryStore::new();
    let creator = crate::create_creator(&store, crate::NewCreator::named("Nova"))
        .await
        .unwrap();
    (store, creator.id)
}

async fn owned_rows(store: &InMemoryStore, collaboration_id: Uuid) -> Vec<RevenueEntry> {
    store
        .find_revenue(&RevenueFilter::owned_by(collaboration_id))
        .await
        .unwrap()
}

#[tokio::test]
async fn repeated_sync_keeps_exactly_one_row() {
    let store = InMemoryStore::new();
    let collaboration = store
        .insert_collaboration(completed_paid(Uuid::new_v4(), 500, date(2024, 3, 15)))
        .await
        .unwrap();

    let first = sync_from_collaboration(&store, &collaboration)
        .await
        .unwrap();
    assert!(matches!(first, SyncOutcome::Created(_)));
    for _ in 0..3 {
        let again = sync_from_collaboration(&store, &collaboration)
            .await
            .unwrap();
        assert_eq!(again, SyncOutcome::Unchanged);
    }

    let rows = owned_rows(&store, collaboration.id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, Decimal::new(500, 0));
    assert_eq!(rows[0].month.to_string(), "2024-03");
    assert_eq!(rows[0].creator_id, collaboration.creator_id);
    assert!(rows[0].is_auto());
}

#[tokio::test]
async fn cancelling_removes_the_row_and_stays_quiet_after() {
    let (store, creator) = store_with_creator().await;
    let created = create_collaboration(&store, completed_paid(creator, 500, date(2024, 3, 15)))
        .await
        .unwrap();
    let Ok(SyncOutcome::Created(entry)) = created.sync else {
        panic!("expected a created row");
    };

    let cancelled = update_collaboration(
        &store,
        created.collaboration.id,
        CollaborationPatch {
            status: Some(CollaborationStatus::Cancelled),
            ..CollaborationPatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cancelled.sync.unwrap(), SyncOutcome::Removed(entry.id));
    assert!(owned_rows(&store, created.collaboration.id).await.is_empty());

    let again = sync_from_collaboration(&store, &cancelled.collaboration)
        .await
        .unwrap();
    assert_eq!(again, SyncOutcome::Unchanged);
}

#[tokio::test]
async fn unpaid_completion_does_not_create_a_row() {
    let (store, creator) = store_with_creator().await;
    let mut new = completed_paid(creator, 500, date(2024, 3, 15));
    new.is_paid = false;

    let created = create_collaboration(&store, new).await.unwrap();
    assert_eq!(created.sync.unwrap(), SyncOutcome::Unchanged);
    assert!(store
        .find_revenue(&RevenueFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn moving_the_signed_date_moves_the_row() {
    let (store, creator) = store_with_creator().await;
    let created = create_collaboration(&store, completed_paid(creator, 500, date(2024, 3, 15)))
        .await
        .unwrap();
    let id = created.collaboration.id;

    let moved = update_collaboration(
        &store,
        id,
        CollaborationPatch {
            contract_signed_date: Some(Some(date(2024, 4, 2))),
            ..CollaborationPatch::default()
        },
    )
    .await
    .unwrap();
    assert!(matches!(moved.sync, Ok(SyncOutcome::Updated(_))));

    let rows = owned_rows(&store, id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].month, ym(2024, 4));
    assert!(store
        .find_revenue(&RevenueFilter {
            month: Some(ym(2024, 3)),
            ..RevenueFilter::default()
        })
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn amount_change_updates_the_row_in_place() {
    let (store, creator) = store_with_creator().await;
    let created = create_collaboration(&store, completed_paid(creator, 500, date(2024, 3, 15)))
        .await
        .unwrap();
    let Ok(SyncOutcome::Created(original)) = created.sync else {
        panic!("expected a created row");
    };

    let updated = update_collaboration(
        &store,
        created.collaboration.id,
        CollaborationPatch {
            payment_amount: Some(Decimal::new(750, 0)),
            ..CollaborationPatch::default()
        },
    )
    .await
    .unwrap();
    let Ok(SyncOutcome::Updated(entry)) = updated.sync else {
        panic!("expected an updated row");
    };
    assert_eq!(entry.id, original.id);
    assert_eq!(entry.amount, Decimal::new(750, 0));
}

#[tokio::test]
async fn missing_signed_date_fails_sync_but_keeps_the_write() {
    let (store, creator) = store_with_creator().await;
    let created = create_collaboration(&store, NewCollaboration::new(creator, "Acme"))
        .await
        .unwrap();

    let update = update_collaboration(
        &store,
        created.collaboration.id,
        CollaborationPatch {
            status: Some(CollaborationStatus::Completed),
            is_paid: Some(true),
            payment_amount: Some(Decimal::new(500, 0)),
            ..CollaborationPatch::default()
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        update.sync,
        Err(CrmError::MissingData {
            field: "contract_signed_date",
            ..
        })
    ));
    assert_eq!(update.collaboration.status, CollaborationStatus::Completed);
    let stored = store
        .get_collaboration(created.collaboration.id)
        .await
        .unwrap();
    assert!(stored.is_paid);
    assert!(owned_rows(&store, stored.id).await.is_empty());
}

#[tokio::test]
async fn ineligible_collaboration_without_date_is_not_an_error() {
    let store = InMemoryStore::new();
    let collaboration = store
        .insert_collaboration(NewCollaboration::new(Uuid::new_v4(), "Acme"))
        .await
        .unwrap();
    assert_eq!(
        sync_from_collaboration(&store, &collaboration)
            .await
            .unwrap(),
        SyncOutcome::Unchanged
    );
}

#[tokio::test]
async fn updating_unknown_collaboration_is_not_found() {
    let store = InMemoryStore::new();
    let err = update_collaboration(&store, Uuid::new_v4(), CollaborationPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn duplicate_owned_rows_collapse_to_one() {
    let store = InMemoryStore::new();
    let collaboration = store
        .insert_collaboration(completed_paid(Uuid::new_v4(), 500, date(2024, 3, 15)))
        .await
        .unwrap();
    for _ in 0..2 {
        store
            .insert_revenue(NewRevenueEntry {
                creator_id: collaboration.creator_id,
                month: ym(2024, 3),
                amount: Decimal::new(500, 0),
                invoiced: false,
                notes: None,
                source_collaboration_id: Some(collaboration.id),
            })
            .await
            .unwrap();
    }

    sync_from_collaboration(&store, &collaboration)
        .await
        .unwrap();
    assert_eq!(owned_rows(&store, collaboration.id).await.len(), 1);
}

#[test]
fn plan_for_fresh_eligible_collaboration_inserts() {
    let now = chrono::Utc::now();
    let collaboration = Collaboration {
        id: Uuid::new_v4(),
        creator_id: Uuid::new_v4(),
        brand_name: "Acme".to_string(),
        status: CollaborationStatus::Completed,
        is_paid: true,
        payment_amount: Decimal::new(500, 0),
        management_fee: None,
        contract_signed_date: Some(date(2024, 3, 15)),
        publication_date: None,
        agent: None,
        notes: None,
        created_at: now,
        updated_at: now,
    };

    let (plan, duplicates) = plan_sync(&collaboration, &[]).unwrap();
    let SyncPlan::Insert(new) = plan else {
        panic!("expected an insert, got {plan:?}");
    };
    assert!(duplicates.is_empty());
    assert_eq!(new.month, ym(2024, 3));
    assert_eq!(new.source_collaboration_id, Some(collaboration.id));
}

#[tokio::test]
async fn resync_repairs_missing_rows_and_reports_failures() {
    let store = InMemoryStore::new();
    // Written straight to the store, as if the process died before syncing.
    let healthy = store
        .insert_collaboration(completed_paid(Uuid::new_v4(), 500, date(2024, 3, 15)))
        .await
        .unwrap();
    let mut undated = completed_paid(Uuid::new_v4(), 200, date(2024, 3, 15));
    undated.contract_signed_date = None;
    let undated = store.insert_collaboration(undated).await.unwrap();
    store
        .insert_collaboration(NewCollaboration::new(Uuid::new_v4(), "Other"))
        .await
        .unwrap();

    let dry = resync_all(&store, true).await.unwrap();
    assert!(dry.dry_run);
    assert_eq!(dry.scanned, 3);
    assert_eq!(dry.created, 1);
    assert!(owned_rows(&store, healthy.id).await.is_empty());

    let report = resync_all(&store, false).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].collaboration_id, undated.id);
    assert_eq!(owned_rows(&store, healthy.id).await.len(), 1);

    let second = resync_all(&store, false).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.unchanged, 2);
}
