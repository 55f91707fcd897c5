//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel rows and domain types
//! and nothing more. Row structs (`models.rs`) and the schema (`schema.rs`)
//! stay private to this module. Connections come from a `bb8` pool driven by
//! `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselTaskRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/tasks")).await?;
//! let repo = DieselTaskRepository::new(pool);
//! ```

mod diesel_credential_repository;
mod diesel_task_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_credential_repository::DieselCredentialRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
