//! Bearer-token gate attaching a verified identity to the request

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::{RequestIdentity, TokenIssuer};

/// Extractor that requires a valid session token.
///
/// The `Authorization` header must exist, be a single value, and match
/// `Bearer <token>`; the token must verify. Any deviation rejects the
/// request with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub RequestIdentity);

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        debug!("Verifying session token");

        let claims = state.token_service.verify(&token).map_err(ApiError::from)?;

        let identity = RequestIdentity::try_from(claims).map_err(ApiError::from)?;

        Ok(RequireIdentity(identity))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();

    let value = match (values.next(), values.next()) {
        (Some(value), None) => value,
        // Absent or repeated header
        _ => return Err(unauthorized()),
    };

    let auth_str = value.to_str().map_err(|_| unauthorized())?;

    let (scheme, token) = auth_str.split_once(' ').ok_or_else(unauthorized)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(unauthorized());
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(unauthorized());
    }

    Ok(token.to_string())
}

fn unauthorized() -> ApiError {
    ApiError::unauthorized(
        "Authentication required. Provide a session token via 'Authorization: Bearer <token>'",
    )
}
