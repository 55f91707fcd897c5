//! Client-side access and state for the task board.
//!
//! The crate is independent of the backend's domain types: it speaks the
//! JSON the HTTP API exposes and nothing more.
//!
//! # Overview
//!
//! - [`TaskApiClient`]: `reqwest` client for login, task CRUD and
//!   suggestions, holding the bearer token after login.
//! - [`TaskBoard`]: the authoritative task list, reconciled from server
//!   records after every mutation, with one error banner.
//! - [`ViewOptions`], [`TaskStatistics`]: pure filters, sort orders and
//!   counters.
//! - [`BoardView`], [`TaskCard`]: render-ready view-models.
//! - [`SuggestionDraft`]: turns free-text suggestions into task drafts.
//!
//! # Example
//!
//! ```
//! use task_client::{SortOrder, StatusFilter, ViewOptions};
//!
//! let options = ViewOptions {
//!     status: StatusFilter::Todo,
//!     sort: SortOrder::Priority,
//!     ..ViewOptions::default()
//! };
//! assert!(options.is_filtered());
//! assert!(options.project(&[]).is_empty());
//! ```

mod api;
mod board;
mod error;
mod model;
mod render;
mod suggestion;
mod view;

pub use api::{TaskApi, TaskApiClient};
pub use board::TaskBoard;
pub use error::ClientError;
pub use model::{
    LoginResponse, NewTask, Task, TaskPriority, TaskStatus, TaskUpdate, cycle_status,
};
pub use render::{BoardView, EmptyState, TaskCard};
pub use suggestion::{SuggestionDraft, clean_suggestion, suggested_title};
pub use view::{PriorityFilter, SortOrder, StatusFilter, TaskStatistics, ViewMode, ViewOptions};
