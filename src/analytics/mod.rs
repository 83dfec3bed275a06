//! Stock analytics derived from the merged stores.
//!
//! [`AnalyticsEngine::compute`] is a pure function of the stock records,
//! the sales aggregate and the selected period length. The result is an
//! immutable [`AnalyticsSnapshot`] tagged with the store generations it was
//! computed from.
//!
//! # Module Structure
//!
//! - [`classify`] - stock levels and distributions
//! - [`sales`] - per-line units sold and daily activity
//! - [`insights`] - ordered rule evaluation
//! - [`filter`] - collection / level selection of stock lines

pub mod classify;
pub mod filter;
pub mod insights;
pub mod sales;

pub use classify::{percent, StockDistribution, StockLevel};
pub use filter::ItemFilter;
pub use insights::{Insight, InsightInputs, InsightKind, Severity};
pub use sales::{avg_daily_sales, SalesAggregate};

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::config::{Config, InsightConfig, StockThresholds};
use crate::model::{StockKey, StockRecord};
use sales::daily_rate;

/// Metrics for one stock line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLine {
    pub key: StockKey,
    pub product_name: String,
    pub product_number: String,
    pub variant_name: String,
    pub collection: String,
    pub quantity: u64,
    pub level: StockLevel,
    pub unit_price: f64,
    pub currency: Option<String>,
    pub line_value: f64,
    /// Units sold in the period, 0 without a period
    pub sold: u64,
    pub avg_daily_sales: f64,
    /// Days the current quantity lasts at the period's rate; `None` when
    /// nothing sold or no period is selected
    pub days_of_cover: Option<f64>,
}

/// A best-selling (product, size) key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSeller {
    pub key: StockKey,
    pub product_name: String,
    pub units: u64,
    pub avg_daily_sales: f64,
}

/// Period-wide sales figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesTotals {
    pub total_units: u64,
    pub order_count: usize,
    pub avg_orders_per_day: f64,
    pub orders_per_day: BTreeMap<NaiveDate, usize>,
}

/// Everything the dashboard shows, computed from one pair of store
/// generations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub stock_generation: u64,
    pub sales_generation: u64,
    /// Selected period, `None` when no sales period is active
    pub period_days: Option<u32>,
    pub stock_distribution: StockDistribution,
    pub collection_distribution: BTreeMap<String, usize>,
    pub total_items: u64,
    pub total_value: f64,
    pub largest_collection: Option<String>,
    /// Fraction of stock lines in the largest collection
    pub largest_collection_share: f64,
    pub insights: Vec<Insight>,
    pub lines: Vec<StockLine>,
    pub top_sellers: Vec<TopSeller>,
    pub sales: SalesTotals,
}

impl AnalyticsSnapshot {
    pub fn has_insight(&self, kind: InsightKind) -> bool {
        self.insights.iter().any(|i| i.kind == kind)
    }

    pub fn filtered_lines<'a>(
        &'a self,
        filter: &'a ItemFilter,
    ) -> impl Iterator<Item = &'a StockLine> + 'a {
        filter.apply(&self.lines)
    }

    /// Distinct collection names, sorted.
    pub fn collections(&self) -> Vec<&str> {
        self.collection_distribution.keys().map(String::as_str).collect()
    }

    /// Collection shares in percent, one decimal.
    pub fn collection_shares(&self) -> BTreeMap<String, f64> {
        let total = self.lines.len();
        self.collection_distribution
            .iter()
            .map(|(name, count)| (name.clone(), percent(*count, total)))
            .collect()
    }
}

/// Inputs for one computation.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsInput<'a> {
    pub stock: &'a [StockRecord],
    pub stock_generation: u64,
    pub sales: &'a SalesAggregate,
    pub sales_generation: u64,
    pub period_days: Option<u32>,
}

/// Computes [`AnalyticsSnapshot`]s with fixed thresholds and tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEngine {
    thresholds: StockThresholds,
    insights: InsightConfig,
    home_currency: String,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AnalyticsEngine {
    pub fn new(thresholds: StockThresholds, insights: InsightConfig, home_currency: &str) -> Self {
        Self {
            thresholds,
            insights,
            home_currency: home_currency.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.thresholds,
            config.insights.clone(),
            &config.currency.home,
        )
    }

    pub fn thresholds(&self) -> &StockThresholds {
        &self.thresholds
    }

    pub fn home_currency(&self) -> &str {
        &self.home_currency
    }

    pub fn compute(&self, input: AnalyticsInput<'_>) -> AnalyticsSnapshot {
        let period = input.period_days;

        let mut distribution = StockDistribution::default();
        let mut collections: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_items = 0u64;
        let mut total_value = 0.0;
        let mut reorder_candidates = 0usize;
        let mut slow_movers = 0usize;
        let mut lines = Vec::with_capacity(input.stock.len());

        for record in input.stock {
            let level = self.thresholds.classify(record.quantity);
            distribution.record(level);
            *collections.entry(record.collection().to_string()).or_insert(0) += 1;

            let price = record.resolve_price(&self.home_currency);
            let unit_price = price.map(|p| p.amount).unwrap_or(0.0);
            let line_value = record.quantity as f64 * unit_price;
            total_items += record.quantity;
            total_value += line_value;

            let key = record.key();
            let (sold, avg, cover) = match period {
                Some(days) => {
                    let sold = input.sales.units_sold(&key);
                    let rate = daily_rate(sold, days);
                    let cover = (rate > 0.0).then(|| record.quantity as f64 / rate);
                    (sold, avg_daily_sales(sold, days), cover)
                }
                None => (0, 0.0, None),
            };

            if period.is_some() {
                if record.quantity > 0
                    && cover.map_or(false, |c| c < self.insights.cover_days_warning)
                {
                    reorder_candidates += 1;
                }
                if level == StockLevel::High && sold == 0 {
                    slow_movers += 1;
                }
            }

            lines.push(StockLine {
                key,
                product_name: record.product_name.clone(),
                product_number: record.product_number.clone(),
                variant_name: record.variant_name.clone(),
                collection: record.collection().to_string(),
                quantity: record.quantity,
                level,
                unit_price,
                currency: price.map(|p| p.currency.clone()),
                line_value,
                sold,
                avg_daily_sales: avg,
                days_of_cover: cover,
            });
        }

        let largest = largest_collection(&collections);
        let largest_share = match &largest {
            Some(name) if !lines.is_empty() => collections[name] as f64 / lines.len() as f64,
            _ => 0.0,
        };

        let insight_inputs = InsightInputs {
            distribution,
            largest_collection: largest.clone(),
            largest_collection_share: largest_share,
            period_active: period.is_some(),
            reorder_candidates,
            slow_movers,
        };
        let insights = insights::evaluate(&insight_inputs, &self.insights);

        let top_sellers = match period {
            Some(days) => self.top_sellers(input.stock, input.sales, days),
            None => Vec::new(),
        };
        let sales = match period {
            Some(days) => sales_totals(input.sales, days),
            None => SalesTotals::default(),
        };

        AnalyticsSnapshot {
            stock_generation: input.stock_generation,
            sales_generation: input.sales_generation,
            period_days: period,
            stock_distribution: distribution,
            collection_distribution: collections,
            total_items,
            total_value,
            largest_collection: largest,
            largest_collection_share: largest_share,
            insights,
            lines,
            top_sellers,
            sales,
        }
    }

    fn top_sellers(
        &self,
        stock: &[StockRecord],
        sales: &SalesAggregate,
        days: u32,
    ) -> Vec<TopSeller> {
        let names: BTreeMap<u64, &str> = stock
            .iter()
            .map(|r| (r.product_id, r.product_name.as_str()))
            .collect();

        let mut ranked: Vec<(&StockKey, u64)> = sales
            .units()
            .iter()
            .filter(|(_, units)| **units > 0)
            .map(|(key, units)| (key, *units))
            .collect();
        // Stable sort keeps key order among equal unit counts
        ranked.sort_by_key(|(_, units)| Reverse(*units));

        ranked
            .into_iter()
            .take(self.insights.top_sellers)
            .map(|(key, units)| TopSeller {
                key: key.clone(),
                product_name: names
                    .get(&key.product_id)
                    .copied()
                    .or_else(|| sales.product_name(key.product_id))
                    .unwrap_or_default()
                    .to_string(),
                units,
                avg_daily_sales: avg_daily_sales(units, days),
            })
            .collect()
    }
}

/// Collection with the most stock lines; ties go to the first name.
fn largest_collection(collections: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (name, count) in collections {
        if best.map_or(true, |(_, top)| *count > top) {
            best = Some((name, *count));
        }
    }
    best.map(|(name, _)| name.clone())
}

fn sales_totals(sales: &SalesAggregate, days: u32) -> SalesTotals {
    SalesTotals {
        total_units: sales.total_units(),
        order_count: sales.order_count(),
        avg_orders_per_day: avg_daily_sales(sales.order_count() as u64, days),
        orders_per_day: sales.orders_per_day().clone(),
    }
}
