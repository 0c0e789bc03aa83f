//! Account service: registration, login, and profile updates

use std::sync::Arc;

use tracing::debug;

use crate::domain::account::{
    validate_password, validate_username, AccessGrants, Account, AccountChanges,
    AccountRepository, NewAccount,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::{RequestIdentity, TokenIssuer};

use super::password::PasswordHasher;

/// Intentionally undifferentiated login failure message; a caller cannot
/// tell a missing account from a wrong password.
const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Request for updating the authenticated account's profile
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub new_username: Option<String>,
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

impl UpdateProfileRequest {
    fn wants_sensitive_change(&self) -> bool {
        self.new_username.is_some() || self.new_password.is_some()
    }
}

/// A freshly issued session token together with the account it was issued for
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub account: Account,
}

/// Orchestrates the credential hasher, token issuer, and account store.
///
/// All three collaborators are injected at construction; the service holds
/// no mutable state of its own.
#[derive(Debug)]
pub struct AccountService<R, H, T> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R, H, T> AccountService<R, H, T>
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenIssuer,
{
    /// Create a new account service
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Register a new account and issue its first session token.
    ///
    /// The username pre-check is advisory; a store-level uniqueness
    /// violation during insert also surfaces as `Conflict`, closing the
    /// check-then-insert race.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedSession, DomainError> {
        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let password_hash = self.hash_password(password.to_string()).await?;

        let account = self
            .repository
            .insert(NewAccount {
                username: username.to_string(),
                password_hash,
                access: AccessGrants::default_for_new_accounts(),
            })
            .await?;

        let token = self.tokens.issue(&account)?;

        debug!(account_id = %account.id(), username = %account.username(), "account registered");

        Ok(IssuedSession { token, account })
    }

    /// Authenticate with username and password and issue a session token
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedSession, DomainError> {
        let account = match self.repository.find_by_username(username).await? {
            Some(account) => account,
            None => return Err(DomainError::credential(INVALID_CREDENTIALS)),
        };

        let verified = self
            .verify_password(password.to_string(), account.password_hash().to_string())
            .await?;

        if !verified {
            return Err(DomainError::credential(INVALID_CREDENTIALS));
        }

        let token = self.tokens.issue(&account)?;

        debug!(account_id = %account.id(), "login succeeded");

        Ok(IssuedSession { token, account })
    }

    /// Update the authenticated account's username and/or password, then
    /// re-issue a token reflecting the new state.
    ///
    /// Preconditions are checked in order, each with a distinct failure:
    /// missing current password for a sensitive change is a credential
    /// error, a wrong current password is forbidden, and a taken username
    /// is a conflict.
    pub async fn update_profile(
        &self,
        identity: &RequestIdentity,
        request: UpdateProfileRequest,
    ) -> Result<IssuedSession, DomainError> {
        if request.wants_sensitive_change() && request.current_password.is_none() {
            return Err(DomainError::credential(
                "current password is required for username or password changes",
            ));
        }

        let account = self
            .repository
            .find_by_id(&identity.account_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Account '{}' not found", identity.account_id))
            })?;

        if let Some(current) = &request.current_password {
            let verified = self
                .verify_password(current.clone(), account.password_hash().to_string())
                .await?;

            if !verified {
                return Err(DomainError::forbidden("current password is incorrect"));
            }
        }

        let mut changes = AccountChanges::default();

        if let Some(new_username) = request.new_username {
            if new_username != account.username() {
                validate_username(&new_username)
                    .map_err(|e| DomainError::validation(e.to_string()))?;

                // Advisory check against other accounts; the store's unique
                // index remains the final arbiter.
                if let Some(existing) = self.repository.find_by_username(&new_username).await? {
                    if existing.id() != account.id() {
                        return Err(DomainError::conflict(format!(
                            "Username '{}' already exists",
                            new_username
                        )));
                    }
                }

                changes.username = Some(new_username);
            }
        }

        if let Some(new_password) = request.new_password {
            validate_password(&new_password).map_err(|e| DomainError::validation(e.to_string()))?;
            changes.password_hash = Some(self.hash_password(new_password).await?);
        }

        let account = if changes.is_empty() {
            account
        } else {
            self.repository.update(&account.id(), changes).await?
        };

        let token = self.tokens.issue(&account)?;

        debug!(account_id = %account.id(), "profile updated");

        Ok(IssuedSession { token, account })
    }

    // Hashing is CPU-bound; run it off the async scheduler.

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))
    }
}
