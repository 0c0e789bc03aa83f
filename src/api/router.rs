use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Authentication endpoints; /auth/profile is gated per-request
        .nest("/auth", auth::create_auth_router())
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::account::{BcryptHasher, InMemoryAccountRepository};
    use crate::infrastructure::auth::{JwtConfig, JwtService, TokenIssuer};

    const TEST_SECRET: &str = "router-test-secret";

    fn test_app() -> Router {
        let state = AppState::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(BcryptHasher::new(crate::infrastructure::account::MIN_COST)),
            Arc::new(JwtService::new(JwtConfig::new(TEST_SECRET, 24))),
        );
        create_router_with_state(state)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_login_and_profile_update_flow() {
        let app = test_app();

        // Register alice
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"username": "alice", "password": "s3cret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 201);
        let token = body["access_token"].as_str().unwrap().to_string();

        let verifier = JwtService::new(JwtConfig::new(TEST_SECRET, 24));
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.username, "alice");

        // Login with the wrong password
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"username": "alice", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Rename alice to alice2 using her token
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/auth/profile")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(
                json!({"newUsername": "alice2", "currentPassword": "s3cret"}).to_string(),
            ))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["user"]["username"], "alice2");
        assert!(body["access_token"].as_str().is_some());

        // The old username no longer resolves
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"username": "alice", "password": "s3cret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The new one does, with the unchanged password
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"username": "alice2", "password": "s3cret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 200);
    }

    #[tokio::test]
    async fn test_duplicate_register_conflicts() {
        let app = test_app();

        let first = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"username": "alice", "password": "s3cret"}),
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"username": "alice", "password": "other"}),
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let body = body_json(second).await;
        assert_eq!(body["statusCode"], 409);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = test_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_profile_without_token_is_unauthorized() {
        let app = test_app();

        let response = app
            .oneshot(json_request(
                Method::PUT,
                "/auth/profile",
                json!({"newUsername": "alice2", "currentPassword": "s3cret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_with_garbage_token_is_unauthorized() {
        let app = test_app();

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/auth/profile")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer not-a-real-token")
            .body(Body::from(json!({}).to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
