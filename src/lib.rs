//! Account Authentication Service
//!
//! Issues and validates bearer credentials for a user account store:
//! - Registration and login with bcrypt-hashed passwords
//! - Signed JWT session tokens carrying identity and access claims
//! - An authorization gate in front of profile mutation
//!
//! Accounts persist in PostgreSQL or an in-memory store for development.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use config::StorageBackend;
use infrastructure::account::{
    BcryptHasher, InMemoryAccountRepository, PostgresAccountRepository,
};
use infrastructure::auth::{JwtConfig, JwtService};

/// Create the application state with all services initialized
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let jwt_config = resolve_jwt_config(config);
    let tokens = Arc::new(JwtService::new(jwt_config));
    let hasher = Arc::new(BcryptHasher::new(config.auth.hash_cost));

    let state = match config.storage.backend {
        StorageBackend::Postgres => {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let repository = PostgresAccountRepository::new(pool);
            repository.ensure_schema().await?;

            AppState::new(Arc::new(repository), hasher, tokens)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory account store; accounts will not survive a restart");

            AppState::new(Arc::new(InMemoryAccountRepository::new()), hasher, tokens)
        }
    };

    Ok(state)
}

/// Resolve the token signing configuration.
///
/// Precedence: `auth.jwt_secret` config, then the `JWT_SECRET` environment
/// variable, then an insecure built-in default that operators are warned
/// about.
fn resolve_jwt_config(config: &AppConfig) -> JwtConfig {
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok());

    match secret {
        Some(secret) => JwtConfig::new(secret, config.auth.token_ttl_hours),
        None => {
            warn!(
                "No signing secret configured (auth.jwt_secret or JWT_SECRET); \
                 falling back to the insecure default - do not run this in production"
            );
            JwtConfig {
                ttl_hours: config.auth.token_ttl_hours,
                ..JwtConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::AccountServiceTrait;
    use crate::infrastructure::auth::TokenIssuer;

    #[tokio::test]
    async fn test_memory_state_composition() {
        let config = AppConfig::default();
        let state = create_app_state_with_config(&config).await.unwrap();

        let session = state
            .account_service
            .register("alice", "s3cret")
            .await
            .unwrap();

        let claims = state.token_service.verify(&session.token).unwrap();
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_configured_secret_wins() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("configured-secret".to_string());
        config.auth.token_ttl_hours = 12;

        let jwt_config = resolve_jwt_config(&config);
        assert_eq!(jwt_config.secret, "configured-secret");
        assert_eq!(jwt_config.ttl_hours, 12);
    }
}
