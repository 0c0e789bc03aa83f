//! Account field validation

use thiserror::Error;

/// Errors that can occur during account validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username contains invalid character: '{0}'. Only alphanumeric characters, underscores, and hyphens are allowed")]
    InvalidUsernameCharacter(char),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} bytes")]
    PasswordTooLong(usize),
}

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
// bcrypt ignores everything past 72 bytes, so longer inputs are rejected
const MAX_PASSWORD_BYTES: usize = 72;

/// Validate a username
///
/// Rules:
/// - Minimum 3 characters
/// - Maximum 50 characters
/// - Only alphanumeric characters, underscores, and hyphens
pub fn validate_username(username: &str) -> Result<(), AccountValidationError> {
    if username.is_empty() {
        return Err(AccountValidationError::EmptyUsername);
    }

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(AccountValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(AccountValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
            return Err(AccountValidationError::InvalidUsernameCharacter(c));
        }
    }

    Ok(())
}

/// Validate a password
///
/// No minimum length is imposed; the only hard limits are non-empty and
/// the hasher's 72-byte input cap.
pub fn validate_password(password: &str) -> Result<(), AccountValidationError> {
    if password.is_empty() {
        return Err(AccountValidationError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AccountValidationError::PasswordTooLong(MAX_PASSWORD_BYTES));
    }

    Ok(())
}
