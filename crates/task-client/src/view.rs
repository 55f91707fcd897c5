//! Pure projections over the board's task list.
//!
//! Nothing here mutates stored tasks: filters and sort orders produce a new
//! borrowed view each time.

use std::cmp::Ordering;

use crate::model::{Task, TaskPriority, TaskStatus};

/// Status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status.
    #[default]
    All,
    /// Not started, including legacy `pending`.
    Todo,
    /// In progress.
    InProgress,
    /// Completed.
    Completed,
}

impl StatusFilter {
    /// Whether `status` passes the filter.
    #[must_use]
    pub const fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Todo => status.is_not_started(),
            Self::InProgress => matches!(status, TaskStatus::InProgress),
            Self::Completed => matches!(status, TaskStatus::Completed),
        }
    }
}

/// Priority filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Every priority.
    #[default]
    All,
    /// Low only.
    Low,
    /// Medium only.
    Medium,
    /// High only.
    High,
}

impl PriorityFilter {
    /// Whether `priority` passes the filter.
    #[must_use]
    pub const fn matches(self, priority: TaskPriority) -> bool {
        matches!(
            (self, priority),
            (Self::All, _)
                | (Self::Low, TaskPriority::Low)
                | (Self::Medium, TaskPriority::Medium)
                | (Self::High, TaskPriority::High)
        )
    }
}

/// Ordering of the visible tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Earliest due date first; undated tasks last.
    #[default]
    DueDate,
    /// Most urgent first.
    Priority,
    /// Alphabetical, ignoring case first.
    Title,
}

impl SortOrder {
    /// Compare two tasks under this order.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Priority => b.priority.weight().cmp(&a.priority.weight()),
            Self::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        }
    }
}

/// Card layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Multi-column grid.
    #[default]
    Grid,
    /// Single column.
    List,
}

/// Everything the user can tweak about how the board is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Status filter.
    pub status: StatusFilter,
    /// Priority filter.
    pub priority: PriorityFilter,
    /// Sort order.
    pub sort: SortOrder,
    /// Layout.
    pub mode: ViewMode,
}

impl ViewOptions {
    /// True when either filter hides something.
    #[must_use]
    pub const fn is_filtered(&self) -> bool {
        !matches!(
            (self.status, self.priority),
            (StatusFilter::All, PriorityFilter::All)
        )
    }

    /// Filter then sort `tasks`. The sort is stable, so ties keep list order.
    #[must_use]
    pub fn project<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut visible: Vec<&Task> = tasks
            .iter()
            .filter(|task| self.status.matches(task.status) && self.priority.matches(task.priority))
            .collect();
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

/// Dashboard counters over the full, unfiltered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStatistics {
    /// All tasks.
    pub total: usize,
    /// Not started, including legacy `pending`.
    pub todo: usize,
    /// In progress.
    pub in_progress: usize,
    /// Completed.
    pub completed: usize,
    /// High priority regardless of status.
    pub high_priority: usize,
}

impl TaskStatistics {
    /// Count `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Todo | TaskStatus::Pending => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            if task.priority == TaskPriority::High {
                stats.high_priority += 1;
            }
            stats
        })
    }
}
