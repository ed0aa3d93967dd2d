#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use habitual_api::auth::jwt::JwtConfig;
use habitual_api::config::{Environment, ServerConfig};
use habitual_api::graphql::build_schema;
use habitual_api::router::build_app_router;
use habitual_api::state::AppState;
use habitual_api::ws::WsManager;
use habitual_db::repositories::UserRepo;
use habitual_events::EventBus;

pub const TEST_PASSWORD: &str = "Password123";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: Environment::Test,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-at-least-32-characters-long".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Application state over `pool` with a fresh bus and socket registry.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        graphql: build_schema(pool.clone()),
        pool,
        config: Arc::new(test_config()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Full router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool), &test_config())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register through the API and return `(user_id, access_token)`.
pub async fn register(pool: &PgPool, email: &str) -> (i64, String) {
    let body = json!({ "email": email, "password": TEST_PASSWORD, "name": "Test User" });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["data"]["user"]["id"].as_i64().unwrap(),
        json["data"]["accessToken"].as_str().unwrap().to_string(),
    )
}

/// Register, promote to admin, and log in again so the token carries the role.
pub async fn register_admin(pool: &PgPool, email: &str) -> (i64, String) {
    let (id, _) = register(pool, email).await;
    UserRepo::update_role(pool, id, "admin").await.unwrap();

    let body = json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    (id, json["data"]["accessToken"].as_str().unwrap().to_string())
}

/// Create a habit through the API and return its JSON.
pub async fn create_habit(pool: &PgPool, token: &str, body: Value) -> Value {
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/habits", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Mark a habit complete on `date` and return the completion JSON.
pub async fn complete(pool: &PgPool, token: &str, habit_id: i64, date: &str) -> Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/habits/{habit_id}/complete"),
        json!({ "date": date }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
