use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use launcher_core::{READY_STATUS, RUNNING_STATUS};

/// Percentage and status text, each independently readable and writable
/// from either thread. Last write wins.
#[derive(Debug, Clone)]
pub struct ProgressState {
    inner: Arc<ProgressInner>,
}

#[derive(Debug)]
struct ProgressInner {
    percent: AtomicU8,
    status: Mutex<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub percent: u8,
    pub status: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                percent: AtomicU8::new(0),
                status: Mutex::new(READY_STATUS.to_string()),
            }),
        }
    }

    /// Stores `percent`, clamped to 100.
    pub fn set_percent(&self, percent: u8) {
        self.inner.percent.store(percent.min(100), Ordering::Release);
    }

    pub fn percent(&self) -> u8 {
        self.inner.percent.load(Ordering::Acquire)
    }

    pub fn set_status(&self, status: impl Into<String>) {
        *self
            .inner
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = status.into();
    }

    pub fn status(&self) -> String {
        self.inner
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            percent: self.percent(),
            status: self.status(),
        }
    }

    pub(crate) fn reset_for_start(&self) {
        self.set_percent(0);
        self.set_status(RUNNING_STATUS);
    }
}
