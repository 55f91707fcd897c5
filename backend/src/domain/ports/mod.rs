//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`LoginService`, `TaskCommand`, `TaskQuery`) are what
//! inbound adapters call. Driven ports (`CredentialRepository`,
//! `TaskRepository`, `SuggestionSource`, `TaskEventSink`) are what domain
//! services call. `TaskEventSource` feeds the live update channel.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_repository;
mod login_service;
mod suggestion_source;
mod task_command;
mod task_events;
mod task_query;
mod task_repository;

#[cfg(test)]
pub use credential_repository::MockCredentialRepository;
pub use credential_repository::{CredentialRepository, CredentialRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use suggestion_source::MockSuggestionSource;
pub use suggestion_source::{DisabledSuggestionSource, SuggestionSource, SuggestionSourceError};
#[cfg(test)]
pub use task_command::MockTaskCommand;
pub use task_command::TaskCommand;
#[cfg(test)]
pub use task_events::MockTaskEventSink;
pub use task_events::{DiscardTaskEvents, TaskEventSink, TaskEventSource};
#[cfg(test)]
pub use task_query::MockTaskQuery;
pub use task_query::TaskQuery;
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{TaskRepository, TaskRepositoryError};
