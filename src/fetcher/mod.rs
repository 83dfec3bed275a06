//! Page fetching capability consumed by the pagination driver.
//!
//! The query service itself is an external collaborator. This module only
//! defines the seam:
//!
//! - [`PageFetcher`] - executes one paginated request and returns typed records
//! - [`Resource`] - binds a resource kind to its filter and record types so a
//!   single driver loop serves both stock and sales
//! - [`json`] - adapter that turns raw JSON responses from a
//!   [`json::QueryTransport`] into records
//!
//! Retry and timeout policy belong to the fetcher implementation. The driver
//! never retries on its own.

pub mod json;

pub use json::{JsonPageFetcher, QueryRequest, QueryTransport};

use std::time::Duration;
use thiserror::Error;

use crate::model::{ResourceKind, SalesOrder, SalesWindow, StockFilter, StockRecord};
use crate::store::Identified;

/// Result type for page fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Why a single page request failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Network or API failure after the fetcher's own retries
    #[error("transport error: {0}")]
    Transport(String),

    /// The response did not have the expected shape
    #[error("malformed page: {0}")]
    MalformedPage(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl FetchError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::MalformedPage(_))
    }
}

/// One paginated request against the query service.
///
/// Implementors must be thread-safe: the stock and sales drivers call the
/// same fetcher concurrently.
pub trait PageFetcher: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Fetch page `page` (1-based) of the stock resource.
    fn fetch_stock_page(
        &self,
        filter: &StockFilter,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<StockRecord>>;

    /// Fetch page `page` (1-based) of the orders placed inside `window`.
    fn fetch_sales_page(
        &self,
        window: &SalesWindow,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<SalesOrder>>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch_stock_page(
        &self,
        filter: &StockFilter,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<StockRecord>> {
        (**self).fetch_stock_page(filter, page, limit)
    }

    fn fetch_sales_page(
        &self,
        window: &SalesWindow,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<SalesOrder>> {
        (**self).fetch_sales_page(window, page, limit)
    }
}

/// A paginated resource: its kind, filter and record type.
pub trait Resource {
    const KIND: ResourceKind;

    type Filter: Sync;
    type Record: Identified + Clone + Send;

    fn fetch<F: PageFetcher + ?Sized>(
        fetcher: &F,
        filter: &Self::Filter,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<Self::Record>>;
}

/// Per-warehouse stock lines.
pub struct Stock;

/// Orders placed inside a sales window.
pub struct Sales;

impl Resource for Stock {
    const KIND: ResourceKind = ResourceKind::Stock;

    type Filter = StockFilter;
    type Record = StockRecord;

    fn fetch<F: PageFetcher + ?Sized>(
        fetcher: &F,
        filter: &StockFilter,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<StockRecord>> {
        fetcher.fetch_stock_page(filter, page, limit)
    }
}

impl Resource for Sales {
    const KIND: ResourceKind = ResourceKind::Sales;

    type Filter = SalesWindow;
    type Record = SalesOrder;

    fn fetch<F: PageFetcher + ?Sized>(
        fetcher: &F,
        window: &SalesWindow,
        page: usize,
        limit: usize,
    ) -> FetchResult<Vec<SalesOrder>> {
        fetcher.fetch_sales_page(window, page, limit)
    }
}
