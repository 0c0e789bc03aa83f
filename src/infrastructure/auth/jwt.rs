//! JWT session token issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

use crate::domain::account::{AccessGrants, Account, AccountId};
use crate::domain::DomainError;

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Username at issuance time
    pub username: String,
    /// Authorization attributes copied from the account at issuance
    pub access: AccessGrants,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    /// Create new claims for an account
    pub fn new(account: &Account, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(ttl_hours as i64);

        Self {
            sub: account.id().to_string(),
            username: account.username().to_string(),
            access: account.access().clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Identity attached to a request after token verification
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub account_id: AccountId,
    pub username: String,
    pub access: AccessGrants,
}

impl TryFrom<SessionClaims> for RequestIdentity {
    type Error = DomainError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let account_id = AccountId::parse(&claims.sub)
            .map_err(|_| DomainError::credential("invalid or expired token"))?;

        Ok(Self {
            account_id,
            username: claims.username,
            access: claims.access,
        })
    }
}

/// Configuration for the JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric signing secret
    pub secret: String,
    /// Token time-to-live in hours
    pub ttl_hours: u64,
}

impl JwtConfig {
    /// Create new JWT configuration
    pub fn new(secret: impl Into<String>, ttl_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        // Insecure fallback; composition warns operators when it is in use
        Self {
            secret: "your-secret-key".to_string(),
            ttl_hours: 24,
        }
    }
}

/// Trait for session token operations
pub trait TokenIssuer: Send + Sync + Debug {
    /// Issue a signed token for an account
    fn issue(&self, account: &Account) -> Result<String, DomainError>;

    /// Verify a token and return its claims.
    ///
    /// Any failure - bad signature, malformed structure, expired - maps to
    /// a `Credential` error; this never panics across the boundary.
    fn verify(&self, token: &str) -> Result<SessionClaims, DomainError>;

    /// Token time-to-live in hours
    fn ttl_hours(&self) -> u64;
}

/// HS256 JWT service backed by a process-wide shared secret
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("ttl_hours", &self.config.ttl_hours)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }
}

impl TokenIssuer for JwtService {
    fn issue(&self, account: &Account) -> Result<String, DomainError> {
        let claims = SessionClaims::new(account, self.config.ttl_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign session token: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, DomainError> {
        let validation = Validation::default();

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                debug!("Token verification failed: {}", e);
                DomainError::credential("invalid or expired token")
            })?;

        Ok(token_data.claims)
    }

    fn ttl_hours(&self) -> u64 {
        self.config.ttl_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccessGrants;

    fn create_test_account() -> Account {
        Account::new(
            AccountId::generate(),
            "alice",
            "hashed_password",
            AccessGrants::default_for_new_accounts(),
        )
    }

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret-key-12345", 24))
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_service();
        let account = create_test_account();

        let token = service.issue(&account).unwrap();
        assert!(!token.is_empty());

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, account.id().to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.access.get("access1"), Some("card1"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_invalid_token() {
        let service = create_service();

        let result = service.verify("invalid-token");
        assert!(matches!(result, Err(DomainError::Credential { .. })));
    }

    #[test]
    fn test_tampered_signature() {
        let service1 = JwtService::new(JwtConfig::new("secret-1", 24));
        let service2 = JwtService::new(JwtConfig::new("secret-2", 24));

        let account = create_test_account();
        let token = service1.issue(&account).unwrap();

        // A token signed with a different secret fails verification
        let result = service2.verify(&token);
        assert!(matches!(result, Err(DomainError::Credential { .. })));
    }

    #[test]
    fn test_expired_token() {
        let service = create_service();
        let account = create_test_account();

        // Craft claims expired well past the default validation leeway
        let past = Utc::now() - Duration::hours(2);
        let claims = SessionClaims {
            sub: account.id().to_string(),
            username: account.username().to_string(),
            access: account.access().clone(),
            iat: (past - Duration::hours(24)).timestamp(),
            exp: past.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        let result = service.verify(&token);
        assert!(matches!(result, Err(DomainError::Credential { .. })));
    }

    #[test]
    fn test_identity_from_claims() {
        let service = create_service();
        let account = create_test_account();

        let token = service.issue(&account).unwrap();
        let claims = service.verify(&token).unwrap();

        let identity = RequestIdentity::try_from(claims).unwrap();
        assert_eq!(identity.account_id, account.id());
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn test_identity_from_bad_subject() {
        let claims = SessionClaims {
            sub: "not-a-uuid".to_string(),
            username: "alice".to_string(),
            access: AccessGrants::default_for_new_accounts(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };

        let result = RequestIdentity::try_from(claims);
        assert!(matches!(result, Err(DomainError::Credential { .. })));
    }

    #[test]
    fn test_ttl_hours() {
        let service = JwtService::new(JwtConfig::new("secret", 48));
        assert_eq!(service.ttl_hours(), 48);
    }

    #[test]
    fn test_default_config() {
        let config = JwtConfig::default();
        assert_eq!(config.ttl_hours, 24);
    }
}
