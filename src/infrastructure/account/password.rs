//! Password hashing using bcrypt

use std::fmt::Debug;

use crate::domain::DomainError;

/// Default bcrypt work factor
pub const DEFAULT_HASH_COST: u32 = 10;

/// Minimum bcrypt work factor (mirrors bcrypt's private `MIN_COST`)
pub(crate) const MIN_COST: u32 = 4;

/// Maximum bcrypt work factor (mirrors bcrypt's private `MAX_COST`)
pub(crate) const MAX_COST: u32 = 31;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password, embedding a fresh random salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a digest; malformed digests verify false
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Bcrypt-based password hasher with a configurable work factor
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the given cost, clamped to bcrypt's valid range
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}
