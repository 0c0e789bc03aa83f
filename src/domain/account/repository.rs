//! Account repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Account, AccountChanges, AccountId, NewAccount};
use crate::domain::DomainError;

/// Repository trait for account storage.
///
/// Username uniqueness is enforced by the implementation; callers may run
/// advisory pre-checks, but a `Conflict` returned from `insert` or `update`
/// is the authoritative signal.
#[async_trait]
pub trait AccountRepository: Send + Sync + Debug {
    /// Get an account by its ID
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Get an account by its username (for login)
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DomainError>;

    /// Insert a new account; the store assigns id and timestamps
    async fn insert(&self, new: NewAccount) -> Result<Account, DomainError>;

    /// Partially update username and/or password hash.
    ///
    /// Fails with `NotFound` if the id is unknown and `Conflict` if the new
    /// username is already taken.
    async fn update(&self, id: &AccountId, changes: AccountChanges)
        -> Result<Account, DomainError>;

    /// Check if a username exists (advisory pre-check)
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_username(username).await?.is_some())
    }
}
