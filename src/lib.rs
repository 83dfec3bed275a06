//! Lageranalys Library
//!
//! Incremental aggregation engine behind an inventory dashboard: paginates
//! the stock and sales resources of a remote query service, merges pages
//! into deduplicated in-memory stores and derives stock analytics, insights
//! and exports that stay consistent as pages arrive.

pub mod analytics;
pub mod config;
pub mod export;
pub mod fetcher;
pub mod model;
pub mod pagination;
pub mod progress;
pub mod session;
pub mod store;

pub use analytics::{AnalyticsEngine, AnalyticsSnapshot, StockLevel};
pub use config::Config;
pub use export::{ExportDocument, ExportFormat};
pub use fetcher::{FetchError, PageFetcher};
pub use model::{SalesLine, SalesOrder, SalesWindow, StockKey, StockRecord};
pub use pagination::{LoadPhase, LoadState, PaginationDriver, RunOutcome};
pub use progress::ProgressReporter;
pub use session::DashboardSession;
pub use store::{EpochToken, Store};
