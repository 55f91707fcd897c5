//! Domain primitives, aggregates and services.
//!
//! Purpose: define the task tracker's entities and use-cases independently of
//! HTTP and storage. Adapters depend on this module; it depends on neither.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic failure payload.
//! - `Task` and its value types, `TaskEvent`, `UserId`, `UserCredential`.
//! - `TokenService`/`verify_token`: bearer token issue and verification.
//! - `CredentialLoginService`, `TaskService`: port implementations.

pub mod auth;
pub mod error;
pub mod login_service;
pub mod password;
pub mod ports;
pub mod task;
pub mod task_event;
pub mod task_service;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::login_service::CredentialLoginService;
pub use self::password::{PasswordHash, PasswordHashError};
pub use self::task::{
    Task, TaskChanges, TaskDraft, TaskId, TaskPriority, TaskStatus, TaskTitle,
    TaskValidationError,
};
pub use self::task_event::TaskEvent;
pub use self::task_service::TaskService;
pub use self::token::{
    IssuedToken, TOKEN_TTL_SECONDS, TokenKeys, TokenService, TokenVerification, verify_token,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserCredential, UserId, UserValidationError, Username};
