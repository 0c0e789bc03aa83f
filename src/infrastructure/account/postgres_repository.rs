//! PostgreSQL account repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

use crate::domain::account::{
    AccessGrants, Account, AccountChanges, AccountId, AccountRepository, NewAccount,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of AccountRepository.
///
/// The unique index on `username` is the authoritative uniqueness check;
/// violation errors from the database map to `Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    access JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)
"#;

impl PostgresAccountRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the accounts table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create schema: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, access, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, access, created_at, updated_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get account by username: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, DomainError> {
        let account = Account::new(
            AccountId::generate(),
            new.username,
            new.password_hash,
            new.access,
        );

        let access_json = serde_json::to_value(account.access())
            .map_err(|e| DomainError::storage(format!("Failed to encode access: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, access, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.username())
        .bind(account.password_hash())
        .bind(access_json)
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "Username '{}' already exists",
                    account.username()
                ))
            } else {
                DomainError::storage(format!("Failed to create account: {}", e))
            }
        })?;

        Ok(account)
    }

    async fn update(
        &self,
        id: &AccountId,
        changes: AccountChanges,
    ) -> Result<Account, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                updated_at = $4
            WHERE id = $1
            RETURNING id, username, password_hash, access, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(changes.username.as_deref())
        .bind(changes.password_hash.as_deref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "Username '{}' already exists",
                    changes.username.as_deref().unwrap_or_default()
                ))
            } else {
                DomainError::storage(format!("Failed to update account: {}", e))
            }
        })?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(DomainError::not_found(format!(
                "Account '{}' not found",
                id
            ))),
        }
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let username: String = row.get("username");
    let password_hash: String = row.get("password_hash");
    let access: serde_json::Value = row.get("access");
    let created_at: chrono::DateTime<Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<Utc> = row.get("updated_at");

    let access: AccessGrants = serde_json::from_value(access)
        .map_err(|e| DomainError::storage(format!("Invalid access data in database: {}", e)))?;

    Ok(Account::restore(
        AccountId::from(id),
        username,
        password_hash,
        access,
        created_at,
        updated_at,
    ))
}
