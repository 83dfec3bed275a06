//! Unit tests for the JSON fetcher adapter driven end to end

use std::sync::Mutex;

use lageranalys::fetcher::{
    FetchError, FetchResult, JsonPageFetcher, PageFetcher, QueryRequest, QueryTransport, Sales,
};
use lageranalys::model::{ResourceKind, SalesOrder, SalesWindow};
use lageranalys::pagination::{DriverConfig, PaginationDriver, RunOutcome};
use lageranalys::store::Store;
use serde_json::{json, Value};

use crate::helpers::today;

/// Serves `orders` pages from a fixed list of order JSON objects.
struct OrdersTransport {
    orders: Vec<Value>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl OrdersTransport {
    fn new(count: usize) -> Self {
        let orders = (1..=count)
            .map(|n| {
                json!({
                    "number": n,
                    "orderDate": "2024-03-15T10:00:00Z",
                    "lines": [{
                        "productVariant": { "product": { "id": 1, "name": "Parka" } },
                        "size": "M",
                        "quantity": 1
                    }]
                })
            })
            .collect();
        Self {
            orders,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl QueryTransport for OrdersTransport {
    fn execute(&self, request: &QueryRequest) -> FetchResult<Value> {
        self.requests.lock().unwrap().push(request.clone());
        let page = request.variables["page"].as_u64().unwrap() as usize;
        let limit = request.variables["limit"].as_u64().unwrap() as usize;
        let slice: Vec<Value> = self
            .orders
            .iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();
        Ok(json!({ "data": { "orders": slice } }))
    }
}

#[test]
fn json_fetcher_paginates_orders() {
    let fetcher = JsonPageFetcher::new(OrdersTransport::new(7));
    let driver = PaginationDriver::new(
        &fetcher,
        DriverConfig {
            page_size: 3,
            max_pages: 10,
        },
    );
    let mut store: Store<SalesOrder> = Store::new();
    let token = store.token();
    let window = SalesWindow::last_days(30, today());

    let outcome = driver.run::<Sales, _>(&window, &token, |token, page| {
        store.ingest_tagged(token, page)
    });

    assert_eq!(outcome, RunOutcome::Completed { pages: 3, records: 7 });
    assert_eq!(store.len(), 7);

    let requests = fetcher.transport().requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.kind == ResourceKind::Sales));
    assert_eq!(requests[2].variables["page"], 3);
}

struct FailingTransport;

impl QueryTransport for FailingTransport {
    fn execute(&self, _request: &QueryRequest) -> FetchResult<Value> {
        Ok(json!({ "errors": [{ "message": "Token expired" }] }))
    }
}

#[test]
fn service_errors_fail_the_fetch() {
    let fetcher = JsonPageFetcher::new(FailingTransport);
    let window = SalesWindow::last_days(30, today());

    assert_eq!(fetcher.name(), "json");
    assert_eq!(
        fetcher.fetch_sales_page(&window, 1, 100).unwrap_err(),
        FetchError::Transport("Token expired".to_string())
    );
}
