//! PostgreSQL persistence adapter for users using Diesel ORM.
//!
//! The layer is split in two:
//!
//! - **Storage engines** implement [`UserStore`]: one statement per call and
//!   failures that reduce to a [`StorageSignal`]. [`DieselUserStore`] is the
//!   PostgreSQL engine, pooled through `diesel-async` and `bb8`.
//! - **The repository adapter** [`UserRepositoryAdapter`] implements the
//!   domain [`UserRepository`](crate::domain::ports::UserRepository) port on
//!   top of any engine. It maps rows, applies deadlines and classifies every
//!   failure into the domain error vocabulary.
//!
//! The schema lives in the crate's `migrations/` directory. Applying it is
//! the operator's job.
//!
//! # Example
//!
//! ```ignore
//! use user_store::outbound::persistence::{
//!     DbPool, DieselUserRepository, DieselUserStore, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(DieselUserStore::new(pool));
//! ```

mod diesel_user_store;
mod error_classifier;
mod models;
mod pool;
mod schema;
mod user_mapping;
mod user_repository_adapter;
mod user_store;

pub use diesel_user_store::{DieselStoreError, DieselUserStore};
pub use error_classifier::{StorageFailure, StorageSignal, classify, is_duplicate_key_message};
pub use models::{NewUserRow, UserChangeset, UserRow};
pub use pool::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
pub use user_repository_adapter::{DieselUserRepository, UserRepositoryAdapter};
pub use self::user_store::{DeleteMode, UserLookup, UserStore};
