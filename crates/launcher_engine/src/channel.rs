use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Unbounded FIFO of text lines from the worker to the interactive thread.
///
/// Clones share the same queue. Neither end ever waits for the other beyond
/// the short critical section of a push or a drain.
#[derive(Debug, Clone, Default)]
pub struct MessageChannel {
    queue: Arc<Mutex<VecDeque<String>>>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line at the tail.
    pub fn push(&self, line: impl Into<String>) {
        self.lock().push_back(line.into());
    }

    /// Removes and returns every queued line in push order.
    pub fn drain_all(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking script must not take the channel down with it.
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
