//! Errors that end a pagination run.

use thiserror::Error;

use crate::fetcher::FetchError;
use crate::model::ResourceKind;

/// Why a pagination run stopped before reaching the last page.
///
/// Pages merged before the failure stay in the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaginationError {
    #[error("{kind} page {page} failed: {source}")]
    Fetch {
        kind: ResourceKind,
        page: usize,
        #[source]
        source: FetchError,
    },

    /// The service returned more records than requested
    #[error("{kind} page {page} returned {received} records, more than the page size {limit}")]
    Oversized {
        kind: ResourceKind,
        page: usize,
        received: usize,
        limit: usize,
    },

    #[error("{kind} pagination stopped after {limit} pages without reaching the end")]
    PageLimitExceeded { kind: ResourceKind, limit: usize },
}

impl PaginationError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            PaginationError::Fetch { kind, .. }
            | PaginationError::Oversized { kind, .. }
            | PaginationError::PageLimitExceeded { kind, .. } => *kind,
        }
    }

    /// True when the failing page could not be interpreted.
    pub fn is_malformed(&self) -> bool {
        match self {
            PaginationError::Fetch { source, .. } => source.is_malformed(),
            PaginationError::Oversized { .. } => true,
            PaginationError::PageLimitExceeded { .. } => false,
        }
    }
}
