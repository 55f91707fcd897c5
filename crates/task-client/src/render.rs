//! View-models for the task board.
//!
//! [`BoardView`] is what a front end draws: the projected cards, the layout,
//! the "Showing X of Y tasks" summary and, when nothing is visible, an empty
//! state whose hint depends on whether filters are active.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{Task, TaskStatus, cycle_status};
use crate::view::{ViewMode, ViewOptions};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One rendered task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    /// Task identifier, for wiring actions.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description, empty when absent.
    pub description: String,
    /// Current status label.
    pub status_label: &'static str,
    /// Label of the status-cycle action, e.g. "Mark as In Progress".
    pub next_action: String,
    /// Priority badge text.
    pub priority_badge: &'static str,
    /// Formatted due date.
    pub due_label: Option<String>,
    /// Due in the past and not completed.
    pub overdue: bool,
    /// Completed tasks are drawn struck through.
    pub completed: bool,
}

impl TaskCard {
    /// Build the card for `task` as of `now`.
    #[must_use]
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        let completed = task.status == TaskStatus::Completed;
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status_label: task.status.label(),
            next_action: format!("Mark as {}", cycle_status(task.status).label()),
            priority_badge: task.priority.label(),
            due_label: task
                .due_date
                .map(|due| due.format(DUE_DATE_FORMAT).to_string()),
            overdue: !completed && task.due_date.is_some_and(|due| due < now),
            completed,
        }
    }
}

/// Message shown when no card is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    /// Headline.
    pub heading: &'static str,
    /// Suggested next step.
    pub hint: &'static str,
}

const NO_TASKS: &str = "No tasks found";
const FILTERED_HINT: &str = "Try changing your filters to see more tasks.";
const EMPTY_HINT: &str = "Get started by creating a new task or asking AI for suggestions.";

/// Complete board rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Layout.
    pub mode: ViewMode,
    /// Visible cards in display order.
    pub cards: Vec<TaskCard>,
    /// "Showing X of Y tasks".
    pub summary: String,
    /// Present when `cards` is empty.
    pub empty_state: Option<EmptyState>,
}

impl BoardView {
    /// Render `tasks` under `options` as of `now`.
    #[must_use]
    pub fn build(tasks: &[Task], options: &ViewOptions, now: DateTime<Utc>) -> Self {
        let cards: Vec<TaskCard> = options
            .project(tasks)
            .into_iter()
            .map(|task| TaskCard::from_task(task, now))
            .collect();
        let summary = format!("Showing {} of {} tasks", cards.len(), tasks.len());
        let empty_state = cards.is_empty().then_some(EmptyState {
            heading: NO_TASKS,
            hint: if options.is_filtered() {
                FILTERED_HINT
            } else {
                EMPTY_HINT
            },
        });
        Self {
            mode: options.mode,
            cards,
            summary,
            empty_state,
        }
    }
}
