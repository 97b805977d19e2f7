//! [`UserRepository`] implementation over any [`UserStore`].
//!
//! The adapter owns the domain contract: it maps values with the user
//! mapper, bounds each call with the optional operation deadline and runs
//! every failure through [`classify`]. Storage engines only execute
//! statements.
//!
//! Updates and deletes that affect zero rows report
//! [`UserRepositoryError::NotFound`]. PostgreSQL counts matched rows, so a
//! zero count means the record is absent or already soft-deleted.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{Operation, UserRepository, UserRepositoryError};
use crate::domain::{User, UserId, UserPatch};

use super::diesel_user_store::DieselUserStore;
use super::error_classifier::classify;
use super::models::{NewUserRow, UserChangeset};
use super::user_mapping::backfill_generated;
use super::user_store::{UserLookup, UserStore};

/// Repository adapter backed by PostgreSQL through Diesel.
pub type DieselUserRepository = UserRepositoryAdapter<DieselUserStore>;

/// Generic repository adapter parameterised by its storage engine.
#[derive(Clone)]
pub struct UserRepositoryAdapter<S> {
    store: S,
    operation_timeout: Option<Duration>,
}

impl<S: UserStore> UserRepositoryAdapter<S> {
    /// Wrap `store` with no operation deadline.
    pub fn new(store: S) -> Self {
        Self {
            store,
            operation_timeout: None,
        }
    }

    /// Abandon any storage call that runs longer than `timeout`.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Configured operation deadline.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    /// Underlying storage engine.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn run<T, F>(&self, operation: Operation, call: F) -> Result<T, UserRepositoryError>
    where
        F: Future<Output = Result<T, S::Error>> + Send,
    {
        let outcome = match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(elapsed) => {
                    warn!(
                        %operation,
                        timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                        "user storage deadline elapsed"
                    );
                    return Err(UserRepositoryError::storage(operation, elapsed));
                }
            },
            None => call.await,
        };
        outcome.map_err(|err| classify(operation, err))
    }
}

fn expect_matched(rows: usize) -> Result<(), UserRepositoryError> {
    if rows == 0 {
        Err(UserRepositoryError::not_found())
    } else {
        Ok(())
    }
}

#[async_trait]
impl<S: UserStore> UserRepository for UserRepositoryAdapter<S> {
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserRepositoryError> {
        let lookup = UserLookup::Id(*id.as_uuid());
        let row = self
            .run(Operation::FindById, self.store.find_one(lookup))
            .await?;
        Ok(User::from(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, UserRepositoryError> {
        let lookup = UserLookup::Email(email.to_owned());
        let row = self
            .run(Operation::FindByEmail, self.store.find_one(lookup))
            .await?;
        Ok(User::from(row))
    }

    async fn create(&self, user: &mut User) -> Result<(), UserRepositoryError> {
        let record = NewUserRow::from(&*user);
        let stored = self
            .run(Operation::Create, self.store.insert(record))
            .await?;

        backfill_generated(user, &stored);
        debug!(user_id = %stored.id, "user created");
        Ok(())
    }

    async fn update(&self, patch: &UserPatch) -> Result<(), UserRepositoryError> {
        let Some(id) = patch.target() else {
            return Err(UserRepositoryError::not_found());
        };
        if patch.is_empty() {
            return Err(UserRepositoryError::invalid_argument(
                "user patch carries no fields to change",
            ));
        }

        let changes = UserChangeset::from(patch);
        let rows = self
            .run(
                Operation::Update,
                self.store.update_matching(*id.as_uuid(), changes),
            )
            .await?;
        expect_matched(rows)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let rows = self
            .run(Operation::Delete, self.store.delete_matching(*id.as_uuid()))
            .await?;
        expect_matched(rows)?;

        debug!(user_id = %id, "user deleted");
        Ok(())
    }
}
