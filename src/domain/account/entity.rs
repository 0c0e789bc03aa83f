//! Account entity and related types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account identifier, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh identifier (used by store implementations)
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque authorization attribute bag carried in session tokens.
///
/// Not a role engine: the service stores and forwards these attributes
/// without interpreting them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessGrants(BTreeMap<String, String>);

impl AccessGrants {
    pub fn new(grants: BTreeMap<String, String>) -> Self {
        Self(grants)
    }

    /// Grants assigned to every newly registered account
    pub fn default_for_new_accounts() -> Self {
        let mut grants = BTreeMap::new();
        grants.insert("access1".to_string(), "card1".to_string());
        grants.insert("access2".to_string(), "card2".to_string());
        Self(grants)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Persisted identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier, stable for the lifetime of the account
    id: AccountId,
    /// Login name, unique across all accounts
    username: String,
    /// Bcrypt digest - never exposed in serialization
    #[serde(skip_serializing)]
    #[serde(default)]
    password_hash: String,
    /// Authorization attributes copied into tokens at issuance
    access: AccessGrants,
    /// Creation timestamp, set once
    created_at: DateTime<Utc>,
    /// Last mutation timestamp
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record with fresh timestamps
    pub fn new(
        id: AccountId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        access: AccessGrants,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            access,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate an account from stored fields
    pub fn restore(
        id: AccountId,
        username: String,
        password_hash: String,
        access: AccessGrants,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            access,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn access(&self) -> &AccessGrants {
        &self.access
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial change set, bumping `updated_at` when anything changed
    pub fn apply(&mut self, changes: &AccountChanges) {
        if changes.is_empty() {
            return;
        }

        if let Some(username) = &changes.username {
            self.username = username.clone();
        }

        if let Some(hash) = &changes.password_hash {
            self.password_hash = hash.clone();
        }

        self.updated_at = Utc::now();
    }
}

/// Insert payload; id and timestamps are assigned by the store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub access: AccessGrants,
}

/// Partial update of the mutable account fields
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_account(username: &str) -> Account {
        Account::new(
            AccountId::generate(),
            username,
            "hashed_password",
            AccessGrants::default_for_new_accounts(),
        )
    }

    #[test]
    fn test_account_id_roundtrip() {
        let id = AccountId::generate();
        let parsed = AccountId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_account_id_parse_invalid() {
        assert!(AccountId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_default_grants() {
        let grants = AccessGrants::default_for_new_accounts();
        assert_eq!(grants.get("access1"), Some("card1"));
        assert_eq!(grants.get("access2"), Some("card2"));
        assert_eq!(grants.get("access3"), None);
    }

    #[test]
    fn test_account_creation() {
        let account = create_test_account("alice");

        assert_eq!(account.username(), "alice");
        assert_eq!(account.password_hash(), "hashed_password");
        assert!(!account.access().is_empty());
        assert_eq!(account.created_at(), account.updated_at());
    }

    #[test]
    fn test_apply_changes() {
        let mut account = create_test_account("alice");
        let created = account.created_at();

        std::thread::sleep(std::time::Duration::from_millis(10));

        account.apply(&AccountChanges {
            username: Some("alice2".to_string()),
            password_hash: None,
        });

        assert_eq!(account.username(), "alice2");
        assert_eq!(account.password_hash(), "hashed_password");
        assert_eq!(account.created_at(), created);
        assert!(account.updated_at() > created);
    }

    #[test]
    fn test_apply_empty_changes_keeps_timestamp() {
        let mut account = create_test_account("alice");
        let updated = account.updated_at();

        account.apply(&AccountChanges::default());

        assert_eq!(account.updated_at(), updated);
    }

    #[test]
    fn test_serialization_excludes_password_hash() {
        let account = create_test_account("alice");

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
    }
}
