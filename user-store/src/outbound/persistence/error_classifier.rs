//! Engine-neutral classification of storage failures.
//!
//! Each storage engine exposes its failures through [`StorageFailure`],
//! reducing them to a [`StorageSignal`]. [`classify`] then turns the signal
//! into the domain vocabulary. Swapping engines means implementing
//! `signal()`; call sites stay unchanged.

use tracing::debug;

use crate::domain::ports::{Operation, UserRepositoryError};

/// Recognisable shape of a storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSignal {
    /// The engine reported that no record matched.
    NotFound,
    /// A uniquely constrained column would hold a duplicate value.
    UniqueViolation { constraint: Option<String> },
    /// Anything else.
    Other,
}

/// Failures an engine reports to the repository adapter.
pub trait StorageFailure: std::error::Error + Send + Sync + 'static {
    /// Reduce this failure to a [`StorageSignal`].
    fn signal(&self) -> StorageSignal;
}

/// Fallback for engines that only report a duplicate key through text.
pub fn is_duplicate_key_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("duplicate key") || lower.contains("violates unique constraint")
}

/// Map a storage failure into the domain error vocabulary.
///
/// Unrecognised failures become [`UserRepositoryError::Storage`] with the
/// original error kept as the source.
pub fn classify<E: StorageFailure>(operation: Operation, error: E) -> UserRepositoryError {
    match error.signal() {
        StorageSignal::NotFound => {
            debug!(%operation, "no user record matched");
            UserRepositoryError::not_found()
        }
        StorageSignal::UniqueViolation { constraint } => {
            debug!(%operation, constraint = ?constraint, "user unique constraint violated");
            UserRepositoryError::duplicate_entry(constraint)
        }
        StorageSignal::Other => {
            debug!(%operation, error = %error, "user storage operation failed");
            UserRepositoryError::storage(operation, error)
        }
    }
}
