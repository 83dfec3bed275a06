//! Canonical, identity-deduplicated record stores
//!
//! A [`Store`] owns the merged collection of one resource. Pages are merged
//! with [`Store::ingest_tagged`], which refuses pages carrying an
//! [`EpochToken`] from before the last [`Store::clear`]. Readers get an
//! immutable [`StoreSnapshot`]; the store copies on write, so a snapshot
//! handed out never changes under a later merge.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Records with a stable identity inside their resource.
pub trait Identified {
    type Id: Eq + Hash + Clone + Debug;

    fn identity(&self) -> Self::Id;
}

/// Tags an in-flight request with the filter epoch it was issued under.
#[derive(Debug, Clone)]
pub struct EpochToken {
    epoch: u64,
    current: Arc<AtomicU64>,
}

impl EpochToken {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// False once the issuing store has been cleared.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.epoch
    }
}

/// Counts from a single merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Result of merging a tagged page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Merged(IngestReport),
    /// The page belongs to a superseded epoch and was discarded
    Stale,
}

/// Immutable view of a store at one merge generation.
#[derive(Debug, Clone)]
pub struct StoreSnapshot<R> {
    generation: u64,
    epoch: u64,
    records: Arc<Vec<R>>,
}

impl<R> StoreSnapshot<R> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }
}

impl<R> Deref for StoreSnapshot<R> {
    type Target = [R];

    fn deref(&self) -> &[R] {
        &self.records
    }
}

/// Canonical collection of one resource.
#[derive(Debug)]
pub struct Store<R: Identified> {
    records: Arc<Vec<R>>,
    index: HashSet<R::Id>,
    generation: u64,
    epoch: Arc<AtomicU64>,
}

impl<R: Identified + Clone> Store<R> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            index: HashSet::new(),
            generation: 0,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Token for the current epoch.
    pub fn token(&self) -> EpochToken {
        EpochToken {
            epoch: self.epoch.load(Ordering::SeqCst),
            current: Arc::clone(&self.epoch),
        }
    }

    /// Merge records, skipping identities already present.
    ///
    /// Idempotent: delivering the same page twice leaves membership
    /// unchanged. The generation advances only when something was inserted.
    pub fn ingest<I>(&mut self, page: I) -> IngestReport
    where
        I: IntoIterator<Item = R>,
    {
        let mut report = IngestReport::default();
        let mut fresh = Vec::new();

        for record in page {
            if self.index.insert(record.identity()) {
                fresh.push(record);
                report.inserted += 1;
            } else {
                report.skipped += 1;
            }
        }

        if !fresh.is_empty() {
            Arc::make_mut(&mut self.records).extend(fresh);
            self.generation += 1;
        }

        report
    }

    /// Merge a page only if `token` still belongs to the current epoch.
    pub fn ingest_tagged<I>(&mut self, token: &EpochToken, page: I) -> IngestOutcome
    where
        I: IntoIterator<Item = R>,
    {
        if !Arc::ptr_eq(&token.current, &self.epoch) || !token.is_current() {
            return IngestOutcome::Stale;
        }
        IngestOutcome::Merged(self.ingest(page))
    }

    /// Empty the store and start a new epoch, invalidating older tokens.
    pub fn clear(&mut self) -> EpochToken {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.records = Arc::new(Vec::new());
        self.index.clear();
        self.generation += 1;
        self.token()
    }

    pub fn snapshot(&self) -> StoreSnapshot<R> {
        StoreSnapshot {
            generation: self.generation,
            epoch: self.epoch.load(Ordering::SeqCst),
            records: Arc::clone(&self.records),
        }
    }

    pub fn contains(&self, id: &R::Id) -> bool {
        self.index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl<R: Identified + Clone> Default for Store<R> {
    fn default() -> Self {
        Self::new()
    }
}
