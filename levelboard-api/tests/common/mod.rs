/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store seeded with one regular
/// user, one admin and the "Running" classification, plus helpers to call
/// it and decode JSON bodies.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use levelboard_api::app::{build_router, AppState};
use levelboard_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use levelboard_shared::auth::jwt::{create_token, Claims, TokenType};
use levelboard_shared::models::classification::{Classification, CreateClassification};
use levelboard_shared::models::user::{CreateUser, User, UserRole};
use levelboard_shared::store::{memory::MemoryStore, Store};
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<dyn Store>,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub admin: User,
    pub running: Classification,
    pub user_token: String,
    pub admin_token: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

pub fn access_token(user_id: Uuid, role: UserRole) -> String {
    create_token(&Claims::new(user_id, role, TokenType::Access), TEST_SECRET).unwrap()
}

impl TestContext {
    pub async fn new() -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let config = test_config();

        let user = store
            .create_user(CreateUser {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "test_hash".to_string(),
            })
            .await
            .unwrap();

        let admin = store
            .create_user(CreateUser {
                username: "root".to_string(),
                email: "root@example.com".to_string(),
                password_hash: "test_hash".to_string(),
            })
            .await
            .unwrap();
        assert!(store.update_user_role(admin.id, UserRole::Admin).await.unwrap());

        let running = store
            .create_classification(CreateClassification {
                name: "Running".to_string(),
                description: "Distance run, in km".to_string(),
            })
            .await
            .unwrap();

        let app = build_router(AppState::new(store.clone(), config.clone()));

        TestContext {
            user_token: access_token(user.id, UserRole::User),
            admin_token: access_token(admin.id, UserRole::Admin),
            store,
            app,
            config,
            user,
            admin,
            running,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    ///
    /// Empty or non-JSON bodies decode to `Value::Null`.
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Current point total of a user, straight from the store
    pub async fn points_of(&self, user_id: Uuid) -> i64 {
        self.store.find_user(user_id).await.unwrap().unwrap().points
    }
}
