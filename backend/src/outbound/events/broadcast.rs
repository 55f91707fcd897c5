//! Task event hub backed by a `tokio::sync::broadcast` channel.
//!
//! One hub serves every connection in the process. Slow subscribers that
//! fall more than [`TaskEventHub::DEFAULT_CAPACITY`] events behind observe
//! `RecvError::Lagged` and are expected to resynchronise.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::TaskEvent;
use crate::domain::ports::{TaskEventSink, TaskEventSource};

/// Process-wide publisher and subscription factory for [`TaskEvent`]s.
#[derive(Debug, Clone)]
pub struct TaskEventHub {
    sender: broadcast::Sender<TaskEvent>,
}

impl TaskEventHub {
    /// Events buffered per subscriber before it lags.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a hub buffering `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TaskEventHub {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl TaskEventSink for TaskEventHub {
    fn publish(&self, event: TaskEvent) {
        let task_id = event.task_id();
        match self.sender.send(event) {
            Ok(receivers) => trace!(%task_id, receivers, "task event published"),
            Err(_) => trace!(%task_id, "task event dropped; no subscribers"),
        }
    }
}

impl TaskEventSource for TaskEventHub {
    fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }
}
