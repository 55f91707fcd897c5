//! In-process fan-out of task change events.

mod broadcast;

pub use broadcast::TaskEventHub;
