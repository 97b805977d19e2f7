//! PostgreSQL-backed [`UserStore`] using Diesel ORM.
//!
//! Every method checks out one pooled connection and runs one statement.
//! In [`DeleteMode::Soft`] each statement only matches rows whose
//! `deleted_at` is NULL, so soft-deleted users behave as absent.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{QueryFragment, QueryId};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use super::error_classifier::{StorageFailure, StorageSignal, is_duplicate_key_message};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::user_store::{DeleteMode, UserLookup, UserStore};

/// Failures raised by [`DieselUserStore`].
#[derive(Debug, thiserror::Error)]
pub enum DieselStoreError {
    /// No pooled connection was available.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The statement failed.
    #[error("diesel operation failed: {0}")]
    Query(#[from] DieselError),
}

impl StorageFailure for DieselStoreError {
    fn signal(&self) -> StorageSignal {
        match self {
            Self::Pool(error) => error.signal(),
            Self::Query(error) => diesel_signal(error),
        }
    }
}

/// Reduce a Diesel error to a storage signal.
///
/// PostgreSQL SQLSTATE 23505 arrives as `DatabaseErrorKind::UniqueViolation`;
/// other kinds are still checked for a duplicate-key message.
fn diesel_signal(error: &DieselError) -> StorageSignal {
    match error {
        DieselError::NotFound => StorageSignal::NotFound,
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            let duplicate = matches!(kind, DatabaseErrorKind::UniqueViolation)
                || is_duplicate_key_message(info.message());
            if duplicate {
                StorageSignal::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            } else {
                StorageSignal::Other
            }
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            StorageSignal::Other
        }
    }
}

/// Diesel-backed implementation of the [`UserStore`] contract.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
    delete_mode: DeleteMode,
}

impl DieselUserStore {
    /// Create a hard-deleting store over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            delete_mode: DeleteMode::Hard,
        }
    }

    /// Choose how `delete_matching` removes rows.
    #[must_use]
    pub fn with_delete_mode(mut self, delete_mode: DeleteMode) -> Self {
        self.delete_mode = delete_mode;
        self
    }
}

/// Rows visible to reads under `mode`.
fn live_users(mode: DeleteMode) -> users::BoxedQuery<'static, Pg> {
    let query = users::table.into_boxed();
    match mode {
        DeleteMode::Hard => query,
        DeleteMode::Soft => query.filter(users::deleted_at.is_null()),
    }
}

/// Stamp `deleted_at` on the live row with `id`.
fn soft_delete_statement(id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::update(
        users::table
            .filter(users::id.eq(id))
            .filter(users::deleted_at.is_null()),
    )
    .set(users::deleted_at.eq(now))
}

#[async_trait]
impl UserStore for DieselUserStore {
    type Error = DieselStoreError;

    async fn find_one(&self, lookup: UserLookup) -> Result<UserRow, Self::Error> {
        let mut conn = self.pool.get().await?;

        let query = match lookup {
            UserLookup::Id(id) => live_users(self.delete_mode).filter(users::id.eq(id)),
            UserLookup::Email(email) => {
                live_users(self.delete_mode).filter(users::email.eq(email))
            }
        };

        let row = query
            .select(UserRow::as_select())
            .first(&mut conn)
            .await?;
        Ok(row)
    }

    async fn insert(&self, row: NewUserRow) -> Result<UserRow, Self::Error> {
        let mut conn = self.pool.get().await?;

        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(stored)
    }

    async fn update_matching(
        &self,
        id: Uuid,
        changes: UserChangeset,
    ) -> Result<usize, Self::Error> {
        let mut conn = self.pool.get().await?;

        let target = users::table.filter(users::id.eq(id));
        let updated = match self.delete_mode {
            DeleteMode::Hard => {
                diesel::update(target)
                    .set(&changes)
                    .execute(&mut conn)
                    .await?
            }
            DeleteMode::Soft => {
                diesel::update(target.filter(users::deleted_at.is_null()))
                    .set(&changes)
                    .execute(&mut conn)
                    .await?
            }
        };
        Ok(updated)
    }

    async fn delete_matching(&self, id: Uuid) -> Result<usize, Self::Error> {
        let mut conn = self.pool.get().await?;

        let removed = match self.delete_mode {
            DeleteMode::Hard => {
                diesel::delete(users::table.filter(users::id.eq(id)))
                    .execute(&mut conn)
                    .await?
            }
            DeleteMode::Soft => soft_delete_statement(id).execute(&mut conn).await?,
        };
        Ok(removed)
    }
}
