use points_ledger::application::ledger::PointsLedger;
use points_ledger::domain::ledger::{Points, PurchaseOutcome};
use points_ledger::domain::ports::KeyValueStore;
use points_ledger::domain::record::{BALANCE_KEY, LEDGER_RECORD_KEY, decode_record};
use points_ledger::error::LedgerError;

mod common;
use common::FlakyStore;

async fn stored_balance(store: &FlakyStore) -> Option<Points> {
    let raw = store.inner().get(LEDGER_RECORD_KEY).await.unwrap()?;
    Some(decode_record(&raw).unwrap().balance)
}

#[tokio::test]
async fn test_unreadable_storage_loads_defaults_without_writing() {
    let store = FlakyStore::new();
    store
        .inner()
        .set(LEDGER_RECORD_KEY, r#"{"balance":900}"#.to_string())
        .await
        .unwrap();
    store.fail_reads(true);

    let ledger = PointsLedger::open(Box::new(store.clone())).await;

    assert_eq!(ledger.balance(), Points::new(400));
    assert_eq!(store.writes(), 0);
    assert_eq!(stored_balance(&store).await, Some(Points::new(900)));
}

#[tokio::test]
async fn test_failed_write_keeps_in_memory_change() {
    let store = FlakyStore::new();
    let ledger = PointsLedger::open(Box::new(store.clone())).await;
    assert_eq!(stored_balance(&store).await, Some(Points::new(400)));

    store.fail_writes(true);
    assert_eq!(ledger.add_points(Points::new(100)).await, Points::new(500));
    assert_eq!(
        ledger.redeem_achievement("a1", Points::new(5)).await,
        points_ledger::domain::ledger::Redemption::Granted(Points::new(5))
    );

    assert_eq!(ledger.balance(), Points::new(505));
    assert!(ledger.is_achievement_redeemed("a1"));
    assert_eq!(stored_balance(&store).await, Some(Points::new(400)));

    store.fail_writes(false);
    ledger.subtract_points(Points::new(5)).await;

    let raw = store.inner().get(LEDGER_RECORD_KEY).await.unwrap().unwrap();
    let persisted = decode_record(&raw).unwrap();
    assert_eq!(persisted.balance, Points::new(500));
    assert!(persisted.redeemed_achievements.contains("a1"));
}

#[tokio::test]
async fn test_purchase_succeeds_even_if_not_persisted() {
    let store = FlakyStore::new();
    let ledger = PointsLedger::open(Box::new(store.clone())).await;
    store.fail_writes(true);

    let outcome = ledger.purchase_item("hat", Points::new(100)).await;

    assert_eq!(outcome, PurchaseOutcome::Purchased);
    assert!(ledger.is_purchased("hat"));
    assert_eq!(ledger.balance(), Points::new(300));
}

#[tokio::test]
async fn test_flush_reports_and_recovers_from_write_failure() {
    let store = FlakyStore::new();
    let ledger = PointsLedger::open(Box::new(store.clone())).await;

    store.fail_writes(true);
    ledger.redeem_card("c1", Points::new(60)).await;

    let err = ledger.flush().await.unwrap_err();
    assert!(matches!(err, LedgerError::StorageWrite { ref key, .. } if key == LEDGER_RECORD_KEY));

    store.fail_writes(false);
    ledger.flush().await.unwrap();
    assert_eq!(stored_balance(&store).await, Some(Points::new(460)));

    let reloaded = PointsLedger::open(Box::new(store.clone())).await;
    assert!(reloaded.is_card_redeemed("c1"));
}

#[tokio::test]
async fn test_failed_migration_leaves_legacy_keys() {
    let store = FlakyStore::new();
    store.inner().set(BALANCE_KEY, "250".to_string()).await.unwrap();
    store.fail_writes(true);

    let ledger = PointsLedger::open(Box::new(store.clone())).await;
    assert_eq!(ledger.balance(), Points::new(250));
    assert!(stored_balance(&store).await.is_none());
    assert_eq!(
        store.inner().get(BALANCE_KEY).await.unwrap().as_deref(),
        Some("250")
    );

    store.fail_writes(false);
    let ledger = PointsLedger::open(Box::new(store.clone())).await;
    assert_eq!(ledger.balance(), Points::new(250));
    assert_eq!(stored_balance(&store).await, Some(Points::new(250)));
    assert!(store.inner().get(BALANCE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_idempotent_operations_do_not_write() {
    let store = FlakyStore::new();
    let ledger = PointsLedger::open(Box::new(store.clone())).await;
    ledger.purchase_item("hat", Points::new(10)).await;
    let writes = store.writes();

    ledger.purchase_item("hat", Points::new(10)).await;
    ledger.purchase_item("castle", Points::new(10_000)).await;

    assert_eq!(store.writes(), writes);
}
