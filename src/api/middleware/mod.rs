//! Request middleware

mod identity;

pub use identity::{extract_bearer_token, RequireIdentity};
