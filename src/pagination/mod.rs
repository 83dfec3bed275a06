//! Incremental pagination of a remote resource.
//!
//! [`PaginationDriver::run`] requests pages 1, 2, 3, ... strictly in order
//! and hands every page to a merge callback before asking for the next one.
//! A page holding fewer records than the page size is the last page; an
//! empty first page completes immediately with zero records.
//!
//! A run stops early when:
//! - a fetch fails: pages merged so far stay merged and the state records
//!   the error
//! - the run's [`EpochToken`] is superseded: the run is cancelled and
//!   nothing further is merged
//! - the configured page limit is reached without seeing a short page

mod error;
mod state;

pub use error::PaginationError;
pub use state::{LoadPhase, LoadState, LoadStateHandle};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::fetcher::{PageFetcher, Resource};
use crate::model::ResourceKind;
use crate::progress::ProgressReporter;
use crate::store::{EpochToken, IngestOutcome};

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Upper bound on pages per run.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// True when a page of `received` records ends the resource.
pub fn is_last_page(received: usize, page_size: usize) -> bool {
    received < page_size
}

/// Requests needed to read `total` records at `page_size` per page.
///
/// An exact multiple of the page size needs one extra request, which comes
/// back empty.
pub fn expected_requests(total: usize, page_size: usize) -> usize {
    total / page_size.max(1) + 1
}

/// Driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The terminating short page was merged
    Completed { pages: usize, records: usize },
    /// A page failed; `merged_pages` pages were merged before it
    Failed {
        error: PaginationError,
        merged_pages: usize,
    },
    /// The run's epoch was superseded
    Cancelled { merged_pages: usize },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn error(&self) -> Option<&PaginationError> {
        match self {
            RunOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Pages through one resource on behalf of a store.
pub struct PaginationDriver<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    config: DriverConfig,
    state: LoadStateHandle,
    progress: Option<Arc<ProgressReporter>>,
}

impl<'a, F: PageFetcher + ?Sized> PaginationDriver<'a, F> {
    pub fn new(fetcher: &'a F, config: DriverConfig) -> Self {
        Self {
            fetcher,
            config,
            state: LoadStateHandle::new(),
            progress: None,
        }
    }

    /// Publish load state through an existing handle.
    pub fn with_state(mut self, state: LoadStateHandle) -> Self {
        self.state = state;
        self
    }

    pub fn with_progress(mut self, progress: Arc<ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> &LoadStateHandle {
        &self.state
    }

    /// Page through resource `R` until the last page, a failure or
    /// cancellation.
    ///
    /// `merge` receives every page together with the run's token and reports
    /// whether the store accepted it.
    pub fn run<R, M>(&self, filter: &R::Filter, token: &EpochToken, mut merge: M) -> RunOutcome
    where
        R: Resource,
        M: FnMut(&EpochToken, Vec<R::Record>) -> IngestOutcome,
    {
        let kind = R::KIND;
        let page_size = self.config.page_size.max(1);
        let label = loading_label(kind);

        self.state.begin(token, fetching_phase(kind), label);
        info!(
            resource = %kind,
            fetcher = self.fetcher.name(),
            epoch = token.epoch(),
            page_size,
            "Starting pagination"
        );

        let mut merged_pages = 0usize;
        let mut records = 0usize;

        loop {
            if !token.is_current() {
                return self.cancelled(kind, merged_pages);
            }

            let page = merged_pages + 1;
            if page > self.config.max_pages {
                let error = PaginationError::PageLimitExceeded {
                    kind,
                    limit: self.config.max_pages,
                };
                return self.failed(token, error, merged_pages);
            }

            let batch = match R::fetch(self.fetcher, filter, page, page_size) {
                Ok(batch) => batch,
                Err(source) => {
                    if !token.is_current() {
                        return self.cancelled(kind, merged_pages);
                    }
                    let error = PaginationError::Fetch { kind, page, source };
                    return self.failed(token, error, merged_pages);
                }
            };

            let received = batch.len();
            if received > page_size {
                let error = PaginationError::Oversized {
                    kind,
                    page,
                    received,
                    limit: page_size,
                };
                return self.failed(token, error, merged_pages);
            }

            let report = match merge(token, batch) {
                IngestOutcome::Merged(report) => report,
                IngestOutcome::Stale => return self.cancelled(kind, merged_pages),
            };

            merged_pages = page;
            records += report.inserted;
            let last = is_last_page(received, page_size);

            debug!(
                resource = %kind,
                page,
                received,
                inserted = report.inserted,
                skipped = report.skipped,
                "Merged page"
            );

            self.state.update(token, |state| {
                state.loaded_pages = merged_pages;
                state.loaded_records = records;
                if last {
                    state.phase = LoadPhase::Ready;
                    state.total_known_pages = Some(merged_pages);
                    state.message = String::new();
                }
            });

            if let Some(ref progress) = self.progress {
                if last {
                    progress.clear(kind);
                } else {
                    progress.set_progress(kind, label, records, None);
                }
            }

            if last {
                info!(resource = %kind, pages = merged_pages, records, "Pagination complete");
                return RunOutcome::Completed {
                    pages: merged_pages,
                    records,
                };
            }
        }
    }

    fn failed(&self, token: &EpochToken, error: PaginationError, merged_pages: usize) -> RunOutcome {
        warn!(resource = %error.kind(), merged_pages, "Pagination failed: {}", error);

        let message = error.to_string();
        self.state.update(token, |state| {
            state.phase = LoadPhase::Failed;
            state.error = Some(message);
            state.message = String::new();
        });
        if let Some(ref progress) = self.progress {
            progress.clear(error.kind());
        }

        RunOutcome::Failed {
            error,
            merged_pages,
        }
    }

    fn cancelled(&self, kind: ResourceKind, merged_pages: usize) -> RunOutcome {
        debug!(resource = %kind, merged_pages, "Pagination cancelled by newer epoch");
        RunOutcome::Cancelled { merged_pages }
    }
}

fn fetching_phase(kind: ResourceKind) -> LoadPhase {
    match kind {
        ResourceKind::Stock => LoadPhase::FetchingStock,
        ResourceKind::Sales => LoadPhase::FetchingSales,
    }
}

fn loading_label(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Stock => "Laddar lagerdata...",
        ResourceKind::Sales => "Laddar försäljningsdata...",
    }
}
