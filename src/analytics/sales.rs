//! Sales aggregation over the active period.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use super::classify::round1;
use crate::model::{SalesOrder, StockKey};

/// Units sold per stock line, plus daily order activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesAggregate {
    units: BTreeMap<StockKey, u64>,
    orders_per_day: BTreeMap<NaiveDate, usize>,
    units_per_day: BTreeMap<NaiveDate, u64>,
    product_names: HashMap<u64, String>,
    order_count: usize,
}

impl SalesAggregate {
    pub fn from_orders<'a, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'a SalesOrder>,
    {
        let mut aggregate = SalesAggregate::default();
        for order in orders {
            aggregate.add_order(order);
        }
        aggregate
    }

    fn add_order(&mut self, order: &SalesOrder) {
        self.order_count += 1;
        *self.orders_per_day.entry(order.order_date).or_insert(0) += 1;

        for line in &order.lines {
            *self.units.entry(line.stock_key()).or_insert(0) += line.quantity;
            *self.units_per_day.entry(order.order_date).or_insert(0) += line.quantity;
            if !line.product_name.is_empty() {
                self.product_names
                    .entry(line.product_id)
                    .or_insert_with(|| line.product_name.clone());
            }
        }
    }

    /// Units sold for `key`, 0 when it never sold.
    pub fn units_sold(&self, key: &StockKey) -> u64 {
        self.units.get(key).copied().unwrap_or(0)
    }

    pub fn units(&self) -> &BTreeMap<StockKey, u64> {
        &self.units
    }

    pub fn total_units(&self) -> u64 {
        self.units.values().sum()
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn orders_per_day(&self) -> &BTreeMap<NaiveDate, usize> {
        &self.orders_per_day
    }

    pub fn units_per_day(&self) -> &BTreeMap<NaiveDate, u64> {
        &self.units_per_day
    }

    /// Product name as seen on an order line.
    pub fn product_name(&self, product_id: u64) -> Option<&str> {
        self.product_names.get(&product_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}

/// Average units per day over `days`, rounded to one decimal.
///
/// A zero-length period counts as one day.
pub fn avg_daily_sales(total: u64, days: u32) -> f64 {
    round1(daily_rate(total, days))
}

/// Unrounded units per day, used for days of cover.
pub(crate) fn daily_rate(total: u64, days: u32) -> f64 {
    total as f64 / f64::from(days.max(1))
}
