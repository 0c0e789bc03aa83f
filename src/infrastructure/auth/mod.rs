//! Authentication infrastructure module
//!
//! This module provides JWT session token management.

mod jwt;

pub use jwt::{JwtConfig, JwtService, RequestIdentity, SessionClaims, TokenIssuer};
