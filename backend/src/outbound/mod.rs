//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for database-less runs
//! - **suggestion**: HTTP client for the remote text-generation service
//! - **events**: in-process broadcast of task changes to live subscribers
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod events;
pub mod memory;
pub mod persistence;
pub mod suggestion;
