//! Account domain
//!
//! This module provides domain types and traits for the account store,
//! including the account entity, validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{AccessGrants, Account, AccountChanges, AccountId, NewAccount};
pub use repository::AccountRepository;
pub use validation::{validate_password, validate_username, AccountValidationError};

#[cfg(test)]
pub use repository::mock::MockAccountRepository;
