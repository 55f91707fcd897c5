//! Turning free-text suggestions into task drafts.

use chrono::{DateTime, Utc};

use crate::model::{NewTask, TaskPriority, TaskStatus};

const TITLE_LABEL: &str = "Task:";

/// Remove every `**` emphasis marker.
#[must_use]
pub fn clean_suggestion(text: &str) -> String {
    text.replace("**", "")
}

/// Title derived from a suggestion: the first line with a leading `Task:`
/// label removed.
///
/// # Examples
/// ```
/// use task_client::suggested_title;
///
/// assert_eq!(suggested_title("Task: Book flights\nCompare fares"), "Book flights");
/// ```
#[must_use]
pub fn suggested_title(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    first_line.replacen(TITLE_LABEL, "", 1).trim().to_owned()
}

/// A cleaned suggestion awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionDraft {
    text: String,
}

impl SuggestionDraft {
    /// Wrap raw service output, stripping emphasis markers.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            text: clean_suggestion(raw),
        }
    }

    /// Cleaned suggestion text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Title the draft would be created with.
    #[must_use]
    pub fn title(&self) -> String {
        suggested_title(&self.text)
    }

    /// Task payload: `todo`, `medium`, due `now`, with the whole suggestion
    /// as its description.
    #[must_use]
    pub fn into_new_task(self, now: DateTime<Utc>) -> NewTask {
        NewTask {
            title: self.title(),
            description: Some(self.text),
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::Medium),
            due_date: Some(now),
        }
    }
}
