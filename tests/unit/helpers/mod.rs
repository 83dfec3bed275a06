//! Test helper utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use lageranalys::fetcher::{FetchError, FetchResult, PageFetcher};
use lageranalys::model::{
    PriceEntry, SalesLine, SalesOrder, SalesWindow, StockFilter, StockRecord,
};
use lageranalys::Config;

type SalesHook = Box<dyn Fn(&SalesWindow, usize) + Send + Sync>;

/// In-memory page fetcher serving fixed stock and orders.
///
/// Stock is paged as-is. Orders are filtered by the requested window, then
/// paged. Failures can be injected per page.
#[derive(Default)]
pub struct FakeFetcher {
    pub stock: Vec<StockRecord>,
    pub orders: Vec<SalesOrder>,
    stock_failures: Mutex<HashMap<usize, FetchError>>,
    sales_failures: Mutex<HashMap<usize, FetchError>>,
    stock_calls: AtomicUsize,
    sales_calls: AtomicUsize,
    sales_requests: Mutex<Vec<(u32, usize)>>,
    on_sales_fetch: Option<SalesHook>,
}

impl FakeFetcher {
    pub fn new(stock: Vec<StockRecord>, orders: Vec<SalesOrder>) -> Self {
        Self {
            stock,
            orders,
            ..Default::default()
        }
    }

    pub fn fail_stock_page(self, page: usize, error: FetchError) -> Self {
        self.stock_failures.lock().unwrap().insert(page, error);
        self
    }

    pub fn fail_sales_page(self, page: usize, error: FetchError) -> Self {
        self.sales_failures.lock().unwrap().insert(page, error);
        self
    }

    /// Run `hook` at the start of every sales request.
    pub fn on_sales_fetch<H>(mut self, hook: H) -> Self
    where
        H: Fn(&SalesWindow, usize) + Send + Sync + 'static,
    {
        self.on_sales_fetch = Some(Box::new(hook));
        self
    }

    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub fn sales_calls(&self) -> usize {
        self.sales_calls.load(Ordering::SeqCst)
    }

    /// (period days, page) of every sales request, in order.
    pub fn sales_requests(&self) -> Vec<(u32, usize)> {
        self.sales_requests.lock().unwrap().clone()
    }
}

fn page_of<T: Clone>(items: &[T], page: usize, limit: usize) -> Vec<T> {
    let start = (page - 1) * limit;
    items.iter().skip(start).take(limit).cloned().collect()
}

impl PageFetcher for FakeFetcher {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn fetch_stock_page(
        &self,
        _filter: &StockFilter,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<StockRecord>> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.stock_failures.lock().unwrap().get(&page) {
            return Err(error.clone());
        }
        Ok(page_of(&self.stock, page, limit))
    }

    fn fetch_sales_page(
        &self,
        window: &SalesWindow,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<SalesOrder>> {
        self.sales_calls.fetch_add(1, Ordering::SeqCst);
        self.sales_requests.lock().unwrap().push((window.days, page));
        if let Some(ref hook) = self.on_sales_fetch {
            hook(window, page);
        }
        if let Some(error) = self.sales_failures.lock().unwrap().get(&page) {
            return Err(error.clone());
        }
        let matching: Vec<SalesOrder> = self
            .orders
            .iter()
            .filter(|o| window.contains(o.order_date))
            .cloned()
            .collect();
        Ok(page_of(&matching, page, limit))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Reference day for period windows in tests.
pub fn today() -> NaiveDate {
    date(2024, 3, 31)
}

pub fn stock_record(
    id: u64,
    name: &str,
    collection: Option<&str>,
    variant: &str,
    size: &str,
    quantity: u64,
    prices: &[(f64, &str)],
) -> StockRecord {
    StockRecord {
        product_id: id,
        product_name: name.to_string(),
        product_number: format!("P-{}", id),
        status: "ACTIVE".to_string(),
        collection_name: collection.map(str::to_string),
        variant_name: variant.to_string(),
        size_name: size.to_string(),
        quantity,
        prices: prices
            .iter()
            .map(|(amount, currency)| PriceEntry::new(*amount, currency))
            .collect(),
    }
}

pub fn order(id: &str, day: NaiveDate, lines: &[(u64, &str, u64)]) -> SalesOrder {
    SalesOrder {
        order_id: id.to_string(),
        order_date: day,
        lines: lines
            .iter()
            .map(|(product_id, size, quantity)| SalesLine {
                product_id: *product_id,
                product_name: format!("Product {}", product_id),
                size_name: size.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

/// Five stock lines: one out, one low, one medium, two high.
///
/// Outdoor holds three of five lines. Total items 78, total SEK value 3550.
pub fn stock_fixture() -> Vec<StockRecord> {
    vec![
        stock_record(1, "Parka", Some("Outdoor"), "Black", "M", 3, &[(30.0, "EUR"), (300.0, "SEK")]),
        stock_record(1, "Parka", Some("Outdoor"), "Black", "L", 0, &[(30.0, "EUR"), (300.0, "SEK")]),
        stock_record(2, "Tee, basic", Some("Basics"), "White", "S", 25, &[(100.0, "SEK")]),
        stock_record(3, "Cap", None, "Navy", "N/A", 10, &[(15.0, "EUR")]),
        stock_record(4, "Sock", Some("Outdoor"), "Grey", "M", 40, &[]),
    ]
}

/// Three orders inside the 30 days up to [`today`], two older ones.
pub fn orders_fixture() -> Vec<SalesOrder> {
    vec![
        order("o1", date(2024, 3, 10), &[(1, "M", 5)]),
        order("o2", date(2024, 3, 20), &[(2, "S", 1)]),
        order("o3", date(2024, 3, 25), &[(1, "M", 2)]),
        order("o4", date(2024, 1, 15), &[(3, "N/A", 4)]),
        order("o5", date(2023, 12, 1), &[(1, "M", 10)]),
    ]
}

/// Default config with a page size small enough to exercise paging.
pub fn test_config(page_size: usize) -> Config {
    let mut config = Config::default();
    config.pagination.page_size = page_size;
    config
}
