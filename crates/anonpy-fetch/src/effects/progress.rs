use std::sync::{Arc, Mutex, PoisonError};

use crate::data::TransferProgress;

/// Sink for transfer progress.
///
/// Callbacks arrive from whichever thread moves the bytes; for uploads that
/// is the HTTP client's body writer, so implementations must be `Send + Sync`.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, _progress: &TransferProgress) {}

    /// `delta` bytes were moved; `progress` already includes them.
    fn advance(&self, _delta: u64, _progress: &TransferProgress) {}

    fn finish(&self, _progress: &TransferProgress) {}
}

/// Reporter that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Shared, monotonic progress state of one transfer.
///
/// Cloned into request bodies so that a retried upload continues from the
/// furthest point already reported instead of starting over at zero.
#[derive(Clone)]
pub struct ProgressTracker {
    state:    Arc<Mutex<TransferProgress>>,
    reporter: Arc<dyn ProgressReporter>,
}

impl ProgressTracker {
    pub fn new(
        reporter: Arc<dyn ProgressReporter>,
        label: impl Into<String>,
        total_bytes: Option<u64>,
    ) -> Self {
        let progress = TransferProgress::new(label, total_bytes);
        reporter.start(&progress);
        Self {
            state: Arc::new(Mutex::new(progress)),
            reporter,
        }
    }

    /// Tracker that reports nowhere.
    pub fn silent(label: impl Into<String>, total_bytes: Option<u64>) -> Self {
        Self::new(Arc::new(NoProgress), label, total_bytes)
    }

    pub fn advance(&self, delta: u64) {
        if delta == 0 {
            return;
        }
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.bytes_transferred = state.bytes_transferred.saturating_add(delta);
            state.clone()
        };
        self.reporter.advance(delta, &snapshot);
    }

    /// Move to absolute `position`; positions at or below the current one
    /// are ignored.
    pub fn advance_to(&self, position: u64) {
        let current = self.bytes();
        if position > current {
            self.advance(position - current);
        }
    }

    pub fn bytes(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bytes_transferred
    }

    pub fn snapshot(&self) -> TransferProgress {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn finish(&self) { self.reporter.finish(&self.snapshot()); }
}
