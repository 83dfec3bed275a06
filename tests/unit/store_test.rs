//! Unit tests for the merge/dedup store

use lageranalys::model::{SalesOrder, StockKey, StockRecord};
use lageranalys::store::{IngestOutcome, Store};

use crate::helpers::{date, order, orders_fixture, stock_fixture, stock_record};

#[test]
fn no_duplicate_identities_under_any_delivery_order() {
    let records = stock_fixture();
    let sequences: [&[usize]; 3] = [&[0, 1, 2, 3, 4], &[4, 3, 2, 1, 0], &[2, 0, 4, 1, 3]];

    for sequence in sequences {
        let mut store: Store<StockRecord> = Store::new();
        // Every record delivered twice, split over overlapping pages
        for window in sequence.windows(2) {
            store.ingest(window.iter().map(|i| records[*i].clone()));
        }
        store.ingest(sequence.iter().map(|i| records[*i].clone()));

        assert_eq!(store.len(), records.len());
        let mut keys: Vec<StockKey> = store.snapshot().iter().map(|r| r.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), records.len());
    }
}

#[test]
fn same_product_different_sizes_are_distinct() {
    let mut store: Store<StockRecord> = Store::new();
    let report = store.ingest(stock_fixture().into_iter().take(2));
    assert_eq!(report.inserted, 2);
    assert!(store.contains(&StockKey::new(1, "M")));
    assert!(store.contains(&StockKey::new(1, "L")));
}

#[test]
fn variants_sharing_a_size_collapse_to_first_seen() {
    let mut store: Store<StockRecord> = Store::new();
    let report = store.ingest(vec![
        stock_record(7, "Jacka", None, "Svart", "M", 3, &[]),
        stock_record(7, "Jacka", None, "Röd", "M", 9, &[]),
        stock_record(7, "Jacka", None, "Röd", "L", 2, &[]),
    ]);

    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 1);
    let snapshot = store.snapshot();
    let medium: Vec<&StockRecord> = snapshot.iter().filter(|r| r.size_name == "M").collect();
    assert_eq!(medium.len(), 1);
    assert_eq!(medium[0].variant_name, "Svart");
    assert_eq!(medium[0].quantity, 3);
}

#[test]
fn redelivered_orders_are_not_double_counted() {
    let mut store: Store<SalesOrder> = Store::new();
    store.ingest(orders_fixture());
    store.ingest(orders_fixture());
    store.ingest(vec![order("o1", date(2024, 3, 10), &[(1, "M", 5)])]);

    let units: u64 = store.snapshot().iter().map(|o| o.units()).sum();
    assert_eq!(store.len(), 5);
    assert_eq!(units, 22);
}

#[test]
fn page_tagged_before_clear_is_discarded() {
    let mut store: Store<SalesOrder> = Store::new();
    let token = store.token();
    store.ingest_tagged(&token, orders_fixture().into_iter().take(1));

    store.clear();
    let outcome = store.ingest_tagged(&token, orders_fixture());
    assert_eq!(outcome, IngestOutcome::Stale);
    assert!(store.is_empty());
}
