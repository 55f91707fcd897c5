//! Process-local repositories used when no database is configured.
//!
//! State lives for the lifetime of the process and is lost on restart. The
//! adapters honour the same owner scoping as the Diesel ones.

mod credential_repository;
mod task_repository;

pub use credential_repository::InMemoryCredentialRepository;
pub use task_repository::InMemoryTaskRepository;
