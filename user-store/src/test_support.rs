//! In-memory storage engine for exercising the repository adapter.
//!
//! [`InMemoryUserStore`] enforces the same constraints as the PostgreSQL
//! schema: a unique primary key, a unique email among live rows and an
//! `updated_at` that advances on every update. It also counts calls and can
//! inject a failure or latency so callers can observe classification and
//! deadlines.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::outbound::persistence::{
    DeleteMode, NewUserRow, StorageFailure, StorageSignal, UserChangeset, UserLookup, UserRow,
    UserStore,
};

/// Name of the primary key constraint.
pub const PRIMARY_KEY_CONSTRAINT: &str = "users_pkey";
/// Name of the partial unique index on live emails.
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Failures raised by [`InMemoryUserStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InMemoryStoreError {
    #[error("no rows returned")]
    NoRows,
    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    UniqueViolation { constraint: String },
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StorageFailure for InMemoryStoreError {
    fn signal(&self) -> StorageSignal {
        match self {
            Self::NoRows => StorageSignal::NotFound,
            Self::UniqueViolation { constraint } => StorageSignal::UniqueViolation {
                constraint: Some(constraint.clone()),
            },
            Self::Unavailable { .. } => StorageSignal::Other,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<UserRow>,
    calls: usize,
    next_failure: Option<String>,
}

/// Thread-safe in-memory `users` table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    state: Arc<Mutex<State>>,
    delete_mode: DeleteMode,
    latency: Option<Duration>,
}

impl InMemoryUserStore {
    /// Create an empty, hard-deleting store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how `delete_matching` removes rows.
    #[must_use]
    pub fn with_delete_mode(mut self, delete_mode: DeleteMode) -> Self {
        self.delete_mode = delete_mode;
        self
    }

    /// Delay every call by `latency` before touching state.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with an opaque error carrying `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().next_failure = Some(message.into());
    }

    /// Number of storage calls issued so far.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Snapshot of every row, soft-deleted ones included.
    pub fn rows(&self) -> Vec<UserRow> {
        self.lock().rows.clone()
    }

    /// Number of live rows holding `email`.
    pub fn live_rows_with_email(&self, email: &str) -> usize {
        self.lock()
            .rows
            .iter()
            .filter(|row| row.deleted_at.is_none() && row.email == email)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn begin(&self) -> Result<MutexGuard<'_, State>, InMemoryStoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        state.calls += 1;
        match state.next_failure.take() {
            Some(message) => Err(InMemoryStoreError::Unavailable { message }),
            None => Ok(state),
        }
    }

    fn is_visible(&self, row: &UserRow) -> bool {
        match self.delete_mode {
            DeleteMode::Hard => true,
            DeleteMode::Soft => row.deleted_at.is_none(),
        }
    }
}

fn email_taken(rows: &[UserRow], email: &str, except: Option<Uuid>) -> bool {
    rows.iter().any(|row| {
        row.deleted_at.is_none() && row.email == email && Some(row.id) != except
    })
}

fn unique_violation(constraint: &str) -> InMemoryStoreError {
    InMemoryStoreError::UniqueViolation {
        constraint: constraint.to_owned(),
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    type Error = InMemoryStoreError;

    async fn find_one(&self, lookup: UserLookup) -> Result<UserRow, Self::Error> {
        let state = self.begin().await?;
        state
            .rows
            .iter()
            .filter(|row| self.is_visible(row))
            .find(|row| match &lookup {
                UserLookup::Id(id) => row.id == *id,
                UserLookup::Email(email) => row.email == *email,
            })
            .cloned()
            .ok_or(InMemoryStoreError::NoRows)
    }

    async fn insert(&self, row: NewUserRow) -> Result<UserRow, Self::Error> {
        let mut state = self.begin().await?;
        let id = row.id.unwrap_or_else(Uuid::new_v4);
        if state.rows.iter().any(|existing| existing.id == id) {
            return Err(unique_violation(PRIMARY_KEY_CONSTRAINT));
        }
        if email_taken(&state.rows, &row.email, None) {
            return Err(unique_violation(EMAIL_CONSTRAINT));
        }

        let now = Utc::now();
        let stored = UserRow {
            id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            role: row.role,
            created_at: row.created_at.unwrap_or(now),
            updated_at: row.updated_at.unwrap_or(now),
            deleted_at: None,
        };
        state.rows.push(stored.clone());
        Ok(stored)
    }

    async fn update_matching(
        &self,
        id: Uuid,
        changes: UserChangeset,
    ) -> Result<usize, Self::Error> {
        let mut state = self.begin().await?;
        let Some(index) = state
            .rows
            .iter()
            .position(|row| row.id == id && self.is_visible(row))
        else {
            return Ok(0);
        };
        if let Some(email) = &changes.email {
            if email_taken(&state.rows, email, Some(id)) {
                return Err(unique_violation(EMAIL_CONSTRAINT));
            }
        }

        let row = &mut state.rows[index];
        let UserChangeset {
            name,
            email,
            password_hash,
            is_active,
            role,
        } = changes;
        if let Some(name) = name {
            row.name = name;
        }
        if let Some(email) = email {
            row.email = email;
        }
        if let Some(password_hash) = password_hash {
            row.password_hash = password_hash;
        }
        if let Some(is_active) = is_active {
            row.is_active = is_active;
        }
        if let Some(role) = role {
            row.role = role;
        }
        row.updated_at = Utc::now().max(row.updated_at);
        Ok(1)
    }

    async fn delete_matching(&self, id: Uuid) -> Result<usize, Self::Error> {
        let mut state = self.begin().await?;
        match self.delete_mode {
            DeleteMode::Hard => {
                let before = state.rows.len();
                state.rows.retain(|row| row.id != id);
                Ok(before - state.rows.len())
            }
            DeleteMode::Soft => {
                let Some(row) = state
                    .rows
                    .iter_mut()
                    .find(|row| row.id == id && row.deleted_at.is_none())
                else {
                    return Ok(0);
                };
                row.deleted_at = Some(Utc::now());
                Ok(1)
            }
        }
    }
}
