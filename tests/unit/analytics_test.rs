//! Unit tests for the analytics engine

use lageranalys::analytics::{
    avg_daily_sales, AnalyticsEngine, AnalyticsInput, AnalyticsSnapshot, InsightKind, ItemFilter,
    SalesAggregate, StockLevel,
};
use lageranalys::config::{InsightConfig, StockThresholds};
use lageranalys::model::{StockKey, StockRecord, NO_COLLECTION};

use crate::helpers::{orders_fixture, stock_fixture, stock_record, today};

fn compute(stock: &[StockRecord], sales: &SalesAggregate, period_days: Option<u32>) -> AnalyticsSnapshot {
    AnalyticsEngine::default().compute(AnalyticsInput {
        stock,
        stock_generation: 1,
        sales,
        sales_generation: 1,
        period_days,
    })
}

fn last_30_days() -> SalesAggregate {
    let window = lageranalys::SalesWindow::last_days(30, today());
    let orders: Vec<_> = orders_fixture()
        .into_iter()
        .filter(|o| window.contains(o.order_date))
        .collect();
    SalesAggregate::from_orders(&orders)
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn classification_boundaries() {
    let t = StockThresholds::default();
    assert_eq!(t.classify(0), StockLevel::Out);
    assert_eq!(t.classify(1), StockLevel::Low);
    assert_eq!(t.classify(4), StockLevel::Low);
    assert_eq!(t.classify(5), StockLevel::Medium);
    assert_eq!(t.classify(19), StockLevel::Medium);
    assert_eq!(t.classify(20), StockLevel::High);
}

#[test]
fn custom_thresholds_move_boundaries() {
    let t = StockThresholds { low: 2, medium: 3 };
    assert_eq!(t.classify(1), StockLevel::Low);
    assert_eq!(t.classify(2), StockLevel::Medium);
    assert_eq!(t.classify(3), StockLevel::High);
}

#[test]
fn level_labels() {
    assert_eq!(StockLevel::Out.label(), "Slut i lager");
    assert_eq!(StockLevel::Low.label(), "Lågt lager");
    assert_eq!(StockLevel::Medium.label(), "Medium lager");
    assert_eq!(StockLevel::High.label(), "Högt lager");
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn stock_aggregates() {
    let snapshot = compute(&stock_fixture(), &SalesAggregate::default(), None);

    let d = snapshot.stock_distribution;
    assert_eq!((d.out, d.low, d.medium, d.high), (1, 1, 1, 2));
    assert_eq!(snapshot.total_items, 78);
    assert_eq!(snapshot.total_value, 3550.0);
    assert_eq!(snapshot.collection_distribution["Outdoor"], 3);
    assert_eq!(snapshot.collection_distribution[NO_COLLECTION], 1);
    assert_eq!(snapshot.largest_collection.as_deref(), Some("Outdoor"));
    assert_eq!(snapshot.largest_collection_share, 0.6);
    assert_eq!(snapshot.collection_shares()["Outdoor"], 60.0);
}

#[test]
fn price_falls_back_to_first_entry() {
    let snapshot = compute(&stock_fixture(), &SalesAggregate::default(), None);
    let cap = snapshot
        .lines
        .iter()
        .find(|l| l.key == StockKey::new(3, "N/A"))
        .unwrap();
    assert_eq!(cap.unit_price, 15.0);
    assert_eq!(cap.currency.as_deref(), Some("EUR"));
    assert_eq!(cap.line_value, 150.0);
}

#[test]
fn avg_daily_sales_values() {
    assert_eq!(avg_daily_sales(30, 30), 1.0);
    assert_eq!(avg_daily_sales(10, 0), 10.0);
}

#[test]
fn per_line_sales_metrics() {
    let snapshot = compute(&stock_fixture(), &last_30_days(), Some(30));
    let parka = snapshot
        .lines
        .iter()
        .find(|l| l.key == StockKey::new(1, "M"))
        .unwrap();

    assert_eq!(parka.sold, 7);
    assert_eq!(parka.avg_daily_sales, 0.2);
    let cover = parka.days_of_cover.unwrap();
    assert!((cover - 90.0 / 7.0).abs() < 1e-9);

    let sock = snapshot
        .lines
        .iter()
        .find(|l| l.key == StockKey::new(4, "M"))
        .unwrap();
    assert_eq!(sock.sold, 0);
    assert!(sock.days_of_cover.is_none());
}

#[test]
fn top_sellers_and_totals() {
    let snapshot = compute(&stock_fixture(), &last_30_days(), Some(30));

    let top: Vec<(StockKey, u64)> = snapshot
        .top_sellers
        .iter()
        .map(|t| (t.key.clone(), t.units))
        .collect();
    assert_eq!(top, vec![(StockKey::new(1, "M"), 7), (StockKey::new(2, "S"), 1)]);
    assert_eq!(snapshot.top_sellers[0].product_name, "Parka");

    assert_eq!(snapshot.sales.total_units, 8);
    assert_eq!(snapshot.sales.order_count, 3);
    assert_eq!(snapshot.sales.avg_orders_per_day, 0.1);
}

#[test]
fn no_period_means_no_sales_metrics() {
    let snapshot = compute(&stock_fixture(), &last_30_days(), None);
    assert!(snapshot.top_sellers.is_empty());
    assert_eq!(snapshot.sales.order_count, 0);
    assert!(snapshot.lines.iter().all(|l| l.sold == 0));
}

#[test]
fn period_switch_to_empty_window_drops_old_sales() {
    let before = compute(&stock_fixture(), &last_30_days(), Some(30));
    assert_eq!(before.lines[0].sold, 7);

    let after = compute(&stock_fixture(), &SalesAggregate::default(), Some(5));
    assert!(after.lines.iter().all(|l| l.sold == 0));
    assert!(after.top_sellers.is_empty());
}

// ============================================================================
// Insights
// ============================================================================

#[test]
fn insights_fire_in_order_for_fixture() {
    let snapshot = compute(&stock_fixture(), &last_30_days(), Some(30));
    let kinds: Vec<InsightKind> = snapshot.insights.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            InsightKind::OutOfStock,
            InsightKind::LowStock,
            InsightKind::Diversify,
            InsightKind::ReorderSoon,
            InsightKind::SlowMovers,
        ]
    );
}

#[test]
fn insights_present_iff_predicates_hold() {
    let healthy = vec![
        stock_record(1, "A", Some("X"), "", "M", 10, &[]),
        stock_record(2, "B", Some("Y"), "", "M", 25, &[]),
    ];
    let snapshot = compute(&healthy, &SalesAggregate::default(), None);
    assert!(!snapshot.has_insight(InsightKind::OutOfStock));
    assert!(!snapshot.has_insight(InsightKind::LowStock));
    // Exactly half is not more than half
    assert!(!snapshot.has_insight(InsightKind::Diversify));
    assert!(snapshot.insights.is_empty());

    let mut with_out = healthy.clone();
    with_out.push(stock_record(3, "C", Some("Z"), "", "M", 0, &[]));
    let snapshot = compute(&with_out, &SalesAggregate::default(), None);
    assert!(snapshot.has_insight(InsightKind::OutOfStock));
    assert!(!snapshot.has_insight(InsightKind::LowStock));
}

#[test]
fn reorder_threshold_is_configurable() {
    let engine = AnalyticsEngine::new(
        StockThresholds::default(),
        InsightConfig {
            cover_days_warning: 10.0,
            ..InsightConfig::default()
        },
        "SEK",
    );
    let sales = last_30_days();
    let snapshot = engine.compute(AnalyticsInput {
        stock: &stock_fixture(),
        stock_generation: 1,
        sales: &sales,
        sales_generation: 1,
        period_days: Some(30),
    });
    // Parka M has about 12.9 days of cover
    assert!(!snapshot.has_insight(InsightKind::ReorderSoon));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn item_filter_by_collection_and_level() {
    let snapshot = compute(&stock_fixture(), &SalesAggregate::default(), None);

    let outdoor = ItemFilter::default().collection("Outdoor");
    assert_eq!(snapshot.filtered_lines(&outdoor).count(), 3);

    let outdoor_high = outdoor.clone().level(StockLevel::High);
    let lines: Vec<_> = snapshot.filtered_lines(&outdoor_high).collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_name, "Sock");

    assert_eq!(snapshot.filtered_lines(&ItemFilter::default()).count(), 5);
    assert_eq!(
        snapshot.collections(),
        vec!["Basics", NO_COLLECTION, "Outdoor"]
    );
}
