//! Dashboard session: the stores, their load states and the latest
//! analytics, driven by one [`PageFetcher`].
//!
//! Stock and sales are paginated concurrently by [`DashboardSession::refresh`].
//! Analytics are recomputed after every merge that inserted records and
//! after every clear, so the published snapshot always matches some pair
//! of store generations.
//!
//! Lock order is snapshot, then period, then a store. Recomputes hold the
//! snapshot lock for their whole duration, so snapshots are published in
//! generation order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::analytics::{AnalyticsEngine, AnalyticsInput, AnalyticsSnapshot, SalesAggregate};
use crate::config::Config;
use crate::export::{ExportDocument, ExportEncoder, ExportError, ExportFormat};
use crate::fetcher::{PageFetcher, Sales, Stock};
use crate::model::{ResourceKind, SalesOrder, SalesWindow, StockFilter, StockRecord};
use crate::pagination::{LoadState, LoadStateHandle, PaginationDriver, RunOutcome};
use crate::progress::ProgressReporter;
use crate::store::{EpochToken, IngestOutcome, Store, StoreSnapshot};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DashboardSession<F: PageFetcher> {
    fetcher: F,
    config: Config,
    engine: AnalyticsEngine,
    stock: Mutex<Store<StockRecord>>,
    sales: Mutex<Store<SalesOrder>>,
    stock_state: LoadStateHandle,
    sales_state: LoadStateHandle,
    progress: Arc<ProgressReporter>,
    period: Mutex<Option<SalesWindow>>,
    snapshot: Mutex<Option<Arc<AnalyticsSnapshot>>>,
}

impl<F: PageFetcher> DashboardSession<F> {
    /// Create a session. If `sales.default_period` is configured, that
    /// period is selected relative to today (UTC).
    pub fn new(fetcher: F, config: Config) -> Self {
        let period = config
            .sales
            .default_period
            .map(|days| SalesWindow::last_days(days, Utc::now().date_naive()));

        Self {
            fetcher,
            engine: AnalyticsEngine::from_config(&config),
            config,
            stock: Mutex::new(Store::new()),
            sales: Mutex::new(Store::new()),
            stock_state: LoadStateHandle::new(),
            sales_state: LoadStateHandle::new(),
            progress: Arc::new(ProgressReporter::new()),
            period: Mutex::new(period),
            snapshot: Mutex::new(None),
        }
    }

    /// Share progress with an external reporter, e.g. one with a listener.
    pub fn with_progress(mut self, progress: Arc<ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Load stock and sales concurrently.
    ///
    /// The sales outcome is `None` when no period is selected.
    pub fn refresh(&self) -> (RunOutcome, Option<RunOutcome>) {
        rayon::join(|| self.load_stock(), || self.load_sales())
    }

    /// Rebuild the stock store from page 1.
    pub fn load_stock(&self) -> RunOutcome {
        let filter = StockFilter {
            warehouse: self.config.stock.warehouse.clone(),
        };
        let token = lock(&self.stock).clear();
        self.recompute();

        self.driver(&self.stock_state)
            .run::<Stock, _>(&filter, &token, |token, page| {
                self.merge_into(&self.stock, token, page)
            })
    }

    /// Rebuild the sales store for the selected period.
    ///
    /// Returns `None` without fetching when no period is selected.
    pub fn load_sales(&self) -> Option<RunOutcome> {
        let (window, token) = self.start_sales_epoch(None);
        self.recompute();

        match window {
            Some(window) => Some(self.run_sales(&window, &token)),
            None => {
                self.sales_state.reset();
                self.progress.clear(ResourceKind::Sales);
                None
            }
        }
    }

    /// Switch to the last `days` days ending `today` and reload sales.
    ///
    /// The previous period's orders are discarded before the first page of
    /// the new period is requested; a sales run still in flight for the
    /// old period is cancelled at its next page boundary.
    pub fn select_period(&self, days: u32, today: NaiveDate) -> RunOutcome {
        let window = SalesWindow::last_days(days, today);
        info!(days, from = %window.from, to = %window.to, "Selecting sales period");

        let (_, token) = self.start_sales_epoch(Some(window));
        self.recompute();

        self.run_sales(&window, &token)
    }

    /// Deselect the sales period and drop all sales data.
    pub fn clear_period(&self) {
        {
            let mut period = lock(&self.period);
            *period = None;
            lock(&self.sales).clear();
        }
        info!("Cleared sales period");
        self.sales_state.reset();
        self.progress.clear(ResourceKind::Sales);
        self.recompute();
    }

    pub fn period(&self) -> Option<SalesWindow> {
        *lock(&self.period)
    }

    pub fn period_choices(&self) -> &[u32] {
        &self.config.sales.period_choices
    }

    /// Latest analytics, `None` before the first load.
    pub fn analytics(&self) -> Option<Arc<AnalyticsSnapshot>> {
        lock(&self.snapshot).clone()
    }

    pub fn stock_state(&self) -> LoadState {
        self.stock_state.snapshot()
    }

    pub fn sales_state(&self) -> LoadState {
        self.sales_state.snapshot()
    }

    pub fn stock_snapshot(&self) -> StoreSnapshot<StockRecord> {
        lock(&self.stock).snapshot()
    }

    pub fn sales_snapshot(&self) -> StoreSnapshot<SalesOrder> {
        lock(&self.sales).snapshot()
    }

    /// Units sold per stock line in the current sales store.
    pub fn sales_aggregate(&self) -> SalesAggregate {
        SalesAggregate::from_orders(self.sales_snapshot().iter())
    }

    /// Export the merged stock as of now.
    pub fn export(&self, format: ExportFormat, today: NaiveDate) -> Result<ExportDocument, ExportError> {
        let encoder = ExportEncoder::new(self.config.thresholds, &self.config.currency.home);
        let stock = self.stock_snapshot();
        encoder.document(&stock, format, &self.config.export.filename_prefix, today)
    }

    /// Export in the configured default format.
    pub fn export_default(&self, today: NaiveDate) -> Result<ExportDocument, ExportError> {
        self.export(self.config.export.format, today)
    }

    fn driver<'s>(&'s self, state: &LoadStateHandle) -> PaginationDriver<'s, F> {
        PaginationDriver::new(&self.fetcher, self.config.pagination.driver())
            .with_state(state.clone())
            .with_progress(Arc::clone(&self.progress))
    }

    /// Optionally select a new window, then clear the sales store under
    /// the period lock so the returned token always matches the window.
    fn start_sales_epoch(&self, select: Option<SalesWindow>) -> (Option<SalesWindow>, EpochToken) {
        let mut period = lock(&self.period);
        if let Some(window) = select {
            *period = Some(window);
        }
        let token = lock(&self.sales).clear();
        (*period, token)
    }

    fn run_sales(&self, window: &SalesWindow, token: &EpochToken) -> RunOutcome {
        self.driver(&self.sales_state)
            .run::<Sales, _>(window, token, |token, page| {
                self.merge_into(&self.sales, token, page)
            })
    }

    fn merge_into<R>(&self, store: &Mutex<Store<R>>, token: &EpochToken, page: Vec<R>) -> IngestOutcome
    where
        R: crate::store::Identified + Clone,
    {
        let outcome = lock(store).ingest_tagged(token, page);
        match outcome {
            IngestOutcome::Merged(report) if report.inserted > 0 => self.recompute(),
            IngestOutcome::Merged(_) => {}
            IngestOutcome::Stale => debug!(epoch = token.epoch(), "Discarded stale page"),
        }
        outcome
    }

    fn recompute(&self) {
        let mut published = lock(&self.snapshot);

        let (period, sales) = {
            let period = lock(&self.period);
            let sales = lock(&self.sales).snapshot();
            (period.map(|w| w.days), sales)
        };
        let stock = lock(&self.stock).snapshot();
        let aggregate = SalesAggregate::from_orders(sales.iter());

        let snapshot = self.engine.compute(AnalyticsInput {
            stock: &stock,
            stock_generation: stock.generation(),
            sales: &aggregate,
            sales_generation: sales.generation(),
            period_days: period,
        });
        debug!(
            stock_generation = snapshot.stock_generation,
            sales_generation = snapshot.sales_generation,
            insights = snapshot.insights.len(),
            "Recomputed analytics"
        );
        *published = Some(Arc::new(snapshot));
    }
}
