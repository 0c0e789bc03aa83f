//! Application state for shared services

use std::sync::Arc;

use crate::domain::account::AccountRepository;
use crate::domain::DomainError;
use crate::infrastructure::account::{
    AccountService, IssuedSession, PasswordHasher, UpdateProfileRequest,
};
use crate::infrastructure::auth::{RequestIdentity, TokenIssuer};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServiceTrait>,
    pub token_service: Arc<dyn TokenIssuer>,
    pub account_store: Arc<dyn AccountRepository>,
}

impl AppState {
    /// Compose the state from concrete collaborators
    pub fn new<R, H, T>(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self
    where
        R: AccountRepository + 'static,
        H: PasswordHasher + 'static,
        T: TokenIssuer + 'static,
    {
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&repository),
            hasher,
            Arc::clone(&tokens),
        ));

        Self {
            account_service,
            token_service: tokens,
            account_store: repository,
        }
    }
}

/// Trait for the account service operations exposed over HTTP
#[async_trait::async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn register(&self, username: &str, password: &str)
        -> Result<IssuedSession, DomainError>;

    async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, DomainError>;

    async fn update_profile(
        &self,
        identity: &RequestIdentity,
        request: UpdateProfileRequest,
    ) -> Result<IssuedSession, DomainError>;
}

#[async_trait::async_trait]
impl<R, H, T> AccountServiceTrait for AccountService<R, H, T>
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenIssuer + 'static,
{
    async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedSession, DomainError> {
        AccountService::register(self, username, password).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, DomainError> {
        AccountService::login(self, username, password).await
    }

    async fn update_profile(
        &self,
        identity: &RequestIdentity,
        request: UpdateProfileRequest,
    ) -> Result<IssuedSession, DomainError> {
        AccountService::update_profile(self, identity, request).await
    }
}
