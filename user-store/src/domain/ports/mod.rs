//! Domain ports and supporting types for the hexagonal boundary.

mod user_repository;

#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{Operation, UserRepository, UserRepositoryError};
