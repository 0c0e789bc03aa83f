//! Authentication API endpoints
//!
//! Provides registration, login, and profile-update endpoints. Response
//! bodies carry an explicit `statusCode` field alongside the HTTP status,
//! which existing clients depend on.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireIdentity;
use crate::api::state::{AccountServiceTrait, AppState};
use crate::api::types::{ApiError, Json};
use crate::infrastructure::account::UpdateProfileRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", put(update_profile))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    pub new_username: Option<String>,
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

/// Token-bearing response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub access_token: String,
}

/// Response for profile updates; echoes the new identity but never the
/// access attributes.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub access_token: String,
    pub user: ProfileUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileUser {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
}

/// Register a new account
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let session = state
        .account_service
        .register(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            status_code: StatusCode::CREATED.as_u16(),
            message: "registration successful".to_string(),
            access_token: session.token,
        }),
    ))
}

/// Login with username and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = state
        .account_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        status_code: StatusCode::OK.as_u16(),
        message: "login successful".to_string(),
        access_token: session.token,
    }))
}

/// Update the authenticated account's username and/or password
///
/// PUT /auth/profile
///
/// Requires `Authorization: Bearer <token>`; returns a re-issued token
/// reflecting the updated account.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let session = state
        .account_service
        .update_profile(
            &identity,
            UpdateProfileRequest {
                new_username: body.new_username,
                new_password: body.new_password,
                current_password: body.current_password,
            },
        )
        .await?;

    Ok(Json(ProfileResponse {
        status_code: StatusCode::OK.as_u16(),
        message: "profile updated".to_string(),
        access_token: session.token,
        user: ProfileUser {
            user_id: session.account.id().to_string(),
            username: session.account.username().to_string(),
        },
    }))
}
