//! Storage engine contract consumed by the user repository adapter.
//!
//! A [`UserStore`] issues exactly one statement per call and reports either
//! a row, a row count, or a failure that implements [`StorageFailure`]. It
//! takes no decisions about the domain error vocabulary.

use async_trait::async_trait;
use uuid::Uuid;

use super::error_classifier::StorageFailure;
use super::models::{NewUserRow, UserChangeset, UserRow};

/// Unique key used for single-row lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(Uuid),
    Email(String),
}

/// How `delete_matching` removes a record.
///
/// Chosen once when the store is built; individual calls cannot override it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove the row.
    #[default]
    Hard,
    /// Stamp `deleted_at` and hide the row from every later statement.
    Soft,
}

/// Single-statement operations over the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Engine failure type.
    type Error: StorageFailure;

    /// Fetch exactly one live row.
    ///
    /// Must fail with a [`StorageSignal::NotFound`](super::StorageSignal)
    /// failure when nothing matches.
    async fn find_one(&self, lookup: UserLookup) -> Result<UserRow, Self::Error>;

    /// Insert a row and return it as stored, generated columns included.
    async fn insert(&self, row: NewUserRow) -> Result<UserRow, Self::Error>;

    /// Apply `changes` to the live row with `id`; returns the matched row
    /// count.
    async fn update_matching(
        &self,
        id: Uuid,
        changes: UserChangeset,
    ) -> Result<usize, Self::Error>;

    /// Remove the live row with `id` according to the store's
    /// [`DeleteMode`]; returns the affected row count.
    async fn delete_matching(&self, id: Uuid) -> Result<usize, Self::Error>;
}
