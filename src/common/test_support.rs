// Fixtures shared by the unit and router tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::auth::models::User;
use crate::auth::tokens::issue_access_token;
use crate::channels::Channel;
use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::common::{generate_channel_id, generate_user_id, migrations, now_rfc3339, AppState, TariffTier};
use crate::services::{QuotaService, StaticFallbackGenerator};

pub const TEST_BOT_TOKEN: &str = "test-bot-token";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Single-connection in-memory database with the full schema
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    migrations::create_schema(&pool).await.expect("schema");
    pool
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        telegram_bot_token: TEST_BOT_TOKEN.to_string(),
        ..AppConfig::default()
    }
}

pub fn test_state(pool: SqlitePool) -> AppState {
    AppState {
        quota_service: Arc::new(QuotaService::new(pool.clone())),
        db: pool,
        config: Arc::new(test_config()),
        dev_mode: DevModeConfig::default(),
        text_generator: Arc::new(StaticFallbackGenerator),
    }
}

/// Full application router over a fresh database
pub async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let state = Arc::new(RwLock::new(test_state(pool.clone())));
    (crate::app_router(state), pool)
}

pub async fn insert_user(pool: &SqlitePool, telegram_id: i64, tier: TariffTier) -> User {
    let id = generate_user_id();
    let now = now_rfc3339();
    sqlx::query(
        "INSERT INTO users (id, telegram_id, username, first_name, tariff, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(telegram_id)
    .bind(format!("user{}", telegram_id))
    .bind("Test")
    .bind(tier.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert user");

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .expect("fetch user")
}

pub async fn insert_channel(
    pool: &SqlitePool,
    owner_id: &str,
    telegram_channel_id: i64,
    username: &str,
    subscribers_count: Option<i64>,
) -> Channel {
    let id = generate_channel_id();
    let now = now_rfc3339();
    sqlx::query(
        "INSERT INTO channels (id, owner_id, telegram_channel_id, username, title, subscribers_count, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(owner_id)
    .bind(telegram_channel_id)
    .bind(username)
    .bind(format!("Channel {}", username))
    .bind(subscribers_count)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert channel");

    sqlx::query_as::<_, Channel>("SELECT * FROM channels WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .expect("fetch channel")
}

pub fn bearer_for(user: &User) -> String {
    let token = issue_access_token(&user.id, user.telegram_id, TEST_JWT_SECRET, 30, Utc::now())
        .expect("token");
    format!("Bearer {}", token)
}

pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

/// Drives one request through the router and decodes the JSON body (Null when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
