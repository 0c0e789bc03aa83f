//! Account infrastructure module
//!
//! This module provides implementations for account management: bcrypt
//! password hashing, the account service, and the in-memory and
//! PostgreSQL repositories.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{BcryptHasher, PasswordHasher, DEFAULT_HASH_COST};
pub(crate) use password::MIN_COST;
pub use postgres_repository::PostgresAccountRepository;
pub use repository::InMemoryAccountRepository;
pub use service::{AccountService, IssuedSession, UpdateProfileRequest};
