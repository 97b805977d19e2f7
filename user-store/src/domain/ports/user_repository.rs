//! Port abstraction for user persistence adapters and their errors.
//!
//! Callers only ever observe the four kinds of [`UserRepositoryError`];
//! engine-specific failures travel as the boxed `source` of
//! [`UserRepositoryError::Storage`].

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;

use crate::domain::{User, UserId, UserPatch};

/// Repository operation that produced a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FindById,
    FindByEmail,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Stable label used in log fields and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindById => "find user by id",
            Self::FindByEmail => "find user by email",
            Self::Create => "create user",
            Self::Update => "update user",
            Self::Delete => "delete user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by user repository adapters.
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    /// No live record matched.
    #[error("user not found")]
    NotFound,
    /// A uniqueness constraint (identifier or email) was violated.
    #[error(
        "user violates unique constraint {}",
        .constraint.as_deref().unwrap_or("<unnamed>")
    )]
    DuplicateEntry { constraint: Option<String> },
    /// The request cannot be issued as given.
    #[error("invalid user repository argument: {message}")]
    InvalidArgument { message: String },
    /// Any other storage failure, keeping the original cause.
    #[error("user repository failed to {operation}: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl UserRepositoryError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn duplicate_entry(constraint: Option<String>) -> Self {
        Self::DuplicateEntry { constraint }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn storage(
        operation: Operation,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Storage {
            operation,
            source: source.into(),
        }
    }

    /// True for [`UserRepositoryError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// True for [`UserRepositoryError::DuplicateEntry`].
    pub fn is_duplicate_entry(&self) -> bool {
        matches!(self, Self::DuplicateEntry { .. })
    }
}

/// Port for user storage and retrieval.
///
/// Implementations must classify failures rather than pre-check them: a
/// duplicate email is detected from the engine's unique-violation signal so
/// concurrent creates cannot slip between a check and an insert.
///
/// Dropping a returned future cancels the in-flight operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a live user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserRepositoryError>;

    /// Fetch a live user by exact email address.
    async fn find_by_email(&self, email: &str) -> Result<User, UserRepositoryError>;

    /// Insert `user`.
    ///
    /// On success the identifier and both timestamps assigned by storage are
    /// written back into `user`. No other field is touched.
    async fn create(&self, user: &mut User) -> Result<(), UserRepositoryError>;

    /// Apply the supplied fields of `patch` to the user it targets.
    ///
    /// A patch without an identifier fails with
    /// [`UserRepositoryError::NotFound`] before storage is contacted.
    async fn update(&self, patch: &UserPatch) -> Result<(), UserRepositoryError>;

    /// Remove (or soft-mark, per adapter configuration) a user.
    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError>;
}
