//! Shared helpers for API integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production) over a migrated test database, and seeds the identity rows
//! the workflow needs.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use sqlx::PgPool;

use caselog_api::auth::jwt::{issue_token, JwtConfig};
use caselog_api::config::ServerConfig;
use caselog_api::router::build_app_router;
use caselog_api::state::AppState;
use caselog_core::roles::Role;
use caselog_core::types::DbId;
use caselog_events::EventBus;

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for the given user against the test secret.
pub fn bearer(user_id: DbId) -> String {
    let token = issue_token(user_id, &test_config().jwt).expect("token should sign");
    format!("Bearer {token}")
}

/// Build a JSON request with authorization.
pub fn json_request(
    method: &str,
    uri: &str,
    user_id: DbId,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a bodyless request with authorization.
pub fn get_request(uri: &str, user_id: DbId) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .body(Body::empty())
        .unwrap()
}

pub async fn seed_workspace(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO workspaces (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_member(pool: &PgPool, workspace_id: DbId, email: &str, role: Role) -> DbId {
    let user_id: DbId = sqlx::query_scalar(
        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind(email.split('@').next().unwrap_or(email))
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES ($1, $2, $3)",
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await
    .unwrap();

    user_id
}
