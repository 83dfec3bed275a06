//! Loading progress for the dashboard.
//!
//! One [`ProgressReporter`] is shared by the stock and sales drivers. It
//! keeps one [`Progress`] entry per [`ResourceKind`], so a driver that
//! finishes only clears its own entry, and forwards every change to an
//! optional listener, which is how a UI layer gets notified.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::ResourceKind;

/// Latest progress report of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub message: String,
    pub loaded: usize,
    /// Total when known, e.g. once the last page has been seen
    pub total: Option<usize>,
}

impl Progress {
    /// Rounded completion percentage, `None` while the total is unknown.
    pub fn percentage(&self) -> Option<u32> {
        match self.total {
            Some(total) if total > 0 => {
                let pct = (self.loaded as f64 / total as f64 * 100.0).round();
                Some(pct.min(100.0) as u32)
            }
            _ => None,
        }
    }
}

type Listener = Box<dyn Fn(ResourceKind, Option<&Progress>) + Send + Sync>;

/// Thread-safe per-resource progress with an optional change listener.
#[derive(Default)]
pub struct ProgressReporter {
    /// Active entries, least recently updated first
    entries: Mutex<Vec<(ResourceKind, Progress)>>,
    listener: Option<Listener>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reporter that calls `listener` on every change.
    ///
    /// The listener receives `None` when a resource's progress is cleared.
    pub fn with_listener<F>(listener: F) -> Self
    where
        F: Fn(ResourceKind, Option<&Progress>) + Send + Sync + 'static,
    {
        Self {
            entries: Mutex::new(Vec::new()),
            listener: Some(Box::new(listener)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(ResourceKind, Progress)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_progress(
        &self,
        kind: ResourceKind,
        message: impl Into<String>,
        loaded: usize,
        total: Option<usize>,
    ) {
        let progress = Progress {
            message: message.into(),
            loaded,
            total,
        };
        let mut entries = self.entries();
        entries.retain(|(k, _)| *k != kind);
        entries.push((kind, progress));
        if let Some(ref listener) = self.listener {
            listener(kind, entries.last().map(|(_, p)| p));
        }
    }

    /// Drop the entry of `kind`; other resources keep reporting.
    pub fn clear(&self, kind: ResourceKind) {
        let mut entries = self.entries();
        entries.retain(|(k, _)| *k != kind);
        if let Some(ref listener) = self.listener {
            listener(kind, None);
        }
    }

    pub fn get(&self, kind: ResourceKind) -> Option<Progress> {
        self.entries()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.clone())
    }

    /// Most recently updated entry of any resource still loading.
    pub fn current(&self) -> Option<Progress> {
        self.entries().last().map(|(_, p)| p.clone())
    }

    pub fn is_loading(&self) -> bool {
        !self.entries().is_empty()
    }

    pub fn percentage(&self) -> Option<u32> {
        self.current().and_then(|p| p.percentage())
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("entries", &*self.entries())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
