//! Shared API types: error shape and JSON extraction

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorBody};
pub use json::Json;
