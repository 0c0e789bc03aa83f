//! Domain layer - Core business logic and entities

pub mod account;
pub mod error;

pub use account::{
    validate_password, validate_username, AccessGrants, Account, AccountChanges, AccountId,
    AccountRepository, AccountValidationError, NewAccount,
};
pub use error::DomainError;
