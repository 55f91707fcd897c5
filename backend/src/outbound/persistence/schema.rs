//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Login accounts provisioned by `provision-user`.
    users (id) {
        id -> Uuid,
        /// Unique login name (max 64 characters).
        username -> Varchar,
        /// PHC-format Argon2id hash.
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks, each owned by exactly one user.
    tasks (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        /// One of `todo`, `in-progress`, `completed`, `pending`.
        status -> Varchar,
        /// One of `low`, `medium`, `high`.
        priority -> Varchar,
        due_date -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, users);
