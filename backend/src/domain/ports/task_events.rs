//! Ports for fanning task changes out to live subscribers.
//!
//! Publishing never fails the mutation that raised the event: sinks drop
//! events nobody is listening for.

use tokio::sync::broadcast;

use crate::domain::TaskEvent;

/// Receives events after the repository has committed a change.
#[cfg_attr(test, mockall::automock)]
pub trait TaskEventSink: Send + Sync {
    /// Hand `event` to current subscribers.
    fn publish(&self, event: TaskEvent);
}

/// Hands out independent subscriptions to the event stream.
pub trait TaskEventSource: Send + Sync {
    /// Start receiving every event published from now on.
    fn subscribe(&self) -> broadcast::Receiver<TaskEvent>;
}

/// Sink used when no live channel is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardTaskEvents;

impl TaskEventSink for DiscardTaskEvents {
    fn publish(&self, _event: TaskEvent) {}
}
