//! In-memory account repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{
    Account, AccountChanges, AccountId, AccountRepository, NewAccount,
};
use crate::domain::DomainError;

/// In-memory implementation of AccountRepository.
///
/// A single write lock covers the uniqueness check and the insert, so the
/// username index plays the role of the database's unique constraint.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    inner: Arc<RwLock<Store>>,
}

#[derive(Debug, Default)]
struct Store {
    accounts: HashMap<AccountId, Account>,
    /// username -> account id
    username_index: HashMap<String, AccountId>,
}

impl InMemoryAccountRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let store = self.inner.read().await;
        Ok(store.accounts.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DomainError> {
        let store = self.inner.read().await;

        Ok(store
            .username_index
            .get(username)
            .and_then(|id| store.accounts.get(id))
            .cloned())
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, DomainError> {
        let mut store = self.inner.write().await;

        if store.username_index.contains_key(&new.username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                new.username
            )));
        }

        let account = Account::new(
            AccountId::generate(),
            new.username,
            new.password_hash,
            new.access,
        );

        store
            .username_index
            .insert(account.username().to_string(), account.id());
        store.accounts.insert(account.id(), account.clone());

        Ok(account)
    }

    async fn update(
        &self,
        id: &AccountId,
        changes: AccountChanges,
    ) -> Result<Account, DomainError> {
        let mut store = self.inner.write().await;

        let old_username = match store.accounts.get(id) {
            Some(account) => account.username().to_string(),
            None => {
                return Err(DomainError::not_found(format!(
                    "Account '{}' not found",
                    id
                )))
            }
        };

        if let Some(new_username) = &changes.username {
            if *new_username != old_username {
                if store.username_index.contains_key(new_username) {
                    return Err(DomainError::conflict(format!(
                        "Username '{}' already exists",
                        new_username
                    )));
                }

                store.username_index.remove(&old_username);
                store.username_index.insert(new_username.clone(), *id);
            }
        }

        let account = store
            .accounts
            .get_mut(id)
            .expect("account present under write lock");
        account.apply(&changes);

        Ok(account.clone())
    }
}
