//! Observable load state of one resource.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::store::EpochToken;

/// Where a resource's load currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    FetchingStock,
    FetchingSales,
    Ready,
    Failed,
}

/// Snapshot of a resource's load state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LoadState {
    pub phase: LoadPhase,
    pub loaded_pages: usize,
    pub loaded_records: usize,
    /// Known once the terminating short page has been seen
    pub total_known_pages: Option<usize>,
    pub message: String,
    pub error: Option<String>,
    #[serde(skip)]
    epoch: u64,
}

impl LoadState {
    /// Epoch of the run that last wrote this state.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            LoadPhase::FetchingStock | LoadPhase::FetchingSales
        )
    }
}

/// Shared, epoch-guarded handle to a [`LoadState`].
///
/// Updates carry the [`EpochToken`] of the run that produced them. Updates
/// from a run older than the last writer are dropped, so a cancelled run can
/// never overwrite the state of its replacement.
#[derive(Debug, Clone, Default)]
pub struct LoadStateHandle {
    inner: Arc<Mutex<LoadState>>,
}

impl LoadStateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> LoadState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` if `token` is current and not older than the last writer.
    ///
    /// Returns whether the update was applied.
    pub fn update<F>(&self, token: &EpochToken, f: F) -> bool
    where
        F: FnOnce(&mut LoadState),
    {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !token.is_current() || token.epoch() < state.epoch {
            return false;
        }
        state.epoch = token.epoch();
        f(&mut state);
        true
    }

    /// Start a fresh run: zero the counters and enter `phase`.
    pub fn begin(&self, token: &EpochToken, phase: LoadPhase, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update(token, |state| {
            state.phase = phase;
            state.loaded_pages = 0;
            state.loaded_records = 0;
            state.total_known_pages = None;
            state.message = message;
            state.error = None;
        })
    }

    /// Return to idle, e.g. when no sales period is selected.
    pub fn reset(&self) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = state.epoch;
        *state = LoadState {
            epoch,
            ..LoadState::default()
        };
    }
}
