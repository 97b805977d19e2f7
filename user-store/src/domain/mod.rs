//! Domain primitives and ports.
//!
//! Purpose: define the user entity the application owns and the repository
//! contract persistence adapters implement. Nothing here knows about SQL.
//!
//! Public surface:
//! - User (alias to `user::User`): application user.
//! - UserId (alias to `user::UserId`): stable UUID identifier.
//! - UserPatch (alias to `user::UserPatch`): explicit partial update.
//! - ports: the `UserRepository` trait and its error vocabulary.

pub mod ports;
pub mod user;

pub use self::user::{DEFAULT_ROLE, User, UserId, UserPatch, UserValidationError};
