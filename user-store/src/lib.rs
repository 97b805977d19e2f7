//! User persistence for PostgreSQL.
//!
//! The crate exposes the [`UserRepository`](domain::ports::UserRepository)
//! port, a Diesel-backed implementation and the configuration needed to
//! build one:
//!
//! ```ignore
//! use user_store::config::PersistenceSettings;
//! use user_store::domain::ports::UserRepository;
//!
//! let settings = PersistenceSettings::load()?;
//! let repo = settings.connect().await?;
//! let user = repo.find_by_email("ada@example.com").await?;
//! ```

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
