//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. They are used by
//! Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts table.
    ///
    /// `email` is unique across rows whose `deleted_at` is NULL
    /// (`users_email_key` partial index).
    users (id) {
        /// Primary key: UUID, defaults to `gen_random_uuid()`.
        id -> Uuid,
        /// Display name (max 255 characters).
        #[max_length = 255]
        name -> Varchar,
        /// Login email (max 255 characters).
        #[max_length = 255]
        email -> Varchar,
        /// Password hash; never logged.
        password_hash -> Text,
        /// Whether the account may sign in.
        is_active -> Bool,
        /// Authorisation role (max 50 characters).
        #[max_length = 50]
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
        /// Soft-delete marker; NULL for live rows.
        deleted_at -> Nullable<Timestamptz>,
    }
}
