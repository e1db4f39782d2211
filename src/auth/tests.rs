//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Access token issuing and validation
//! - Login request bodies (widget fields and Mini App initData)
//! - The Telegram login flow and the /me endpoint
//! - Profile refresh of returning users and the dev mode bypass

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{
        bearer_for, insert_user, json_request, send, test_app, test_pool, test_state,
        TEST_BOT_TOKEN, TEST_JWT_SECRET,
    };
    use crate::common::{ApiError, TariffTier};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use handlers::payload_from_body;
    use models::TelegramIdentity;
    use serde_json::{json, Value};
    use services::UsersService;
    use signature::{sign, AuthPayload, AuthValue};
    use std::sync::Arc;
    use tokens::{bearer_token, decode_access_token, issue_access_token};
    use tokio::sync::RwLock;

    /// Login widget body signed with the test bot token
    fn signed_widget_body(fields: Value) -> Value {
        let Value::Object(mut object) = fields else {
            panic!("expected an object");
        };
        let payload = AuthPayload::from_json_object(&object).without_nulls();
        object.insert("hash".to_string(), json!(sign(&payload, TEST_BOT_TOKEN.as_bytes())));
        Value::Object(object)
    }

    fn identity(telegram_id: i64, username: &str) -> TelegramIdentity {
        TelegramIdentity {
            telegram_id,
            username: Some(username.to_string()),
            first_name: Some("Ann".to_string()),
            last_name: None,
            photo_url: None,
            auth_date: Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let now = Utc::now();
        let token = issue_access_token("U_ABC", 42, "secret", 30, now).unwrap();

        let claims = decode_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "U_ABC");
        assert_eq!(claims.telegram_id, 42);
        assert_eq!(claims.exp as i64, (now + Duration::days(30)).timestamp());

        let err = decode_access_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref msg) if msg == "invalid token"));
    }

    #[test]
    fn test_expired_access_token_is_rejected() {
        let issued = Utc::now() - Duration::days(31);
        let token = issue_access_token("U_ABC", 42, "secret", 30, issued).unwrap();
        assert!(decode_access_token(&token, "secret").is_err());
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc "), Some("abc"));
        assert_eq!(bearer_token("abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   "), None);
    }

    #[test]
    fn test_payload_from_widget_body_drops_nulls() {
        let payload = payload_from_body(&json!({
            "id": 42,
            "first_name": "Ann",
            "last_name": null,
            "auth_date": 1_700_000_000,
            "hash": "abc"
        }))
        .unwrap();
        assert_eq!(payload.len(), 4);
        assert!(!payload.contains_key("last_name"));
        assert_eq!(payload.get("id"), Some(&AuthValue::Integer(42)));
    }

    #[test]
    fn test_payload_from_init_data_body() {
        let payload = payload_from_body(&json!({
            "init_data": "auth_date=1700000000&user=%7B%22id%22%3A42%2C%22first_name%22%3A%22Ann%22%7D&hash=abc"
        }))
        .unwrap();
        assert_eq!(payload.get("id").and_then(AuthValue::as_i64), Some(42));
        assert_eq!(payload.get("first_name").and_then(AuthValue::as_text).as_deref(), Some("Ann"));
        assert!(!payload.contains_key("user"));
    }

    #[test]
    fn test_payload_from_bad_bodies() {
        assert!(matches!(payload_from_body(&json!([1, 2])), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            payload_from_body(&json!({"init_data": 5})),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_refreshes_profile_of_returning_user() {
        let pool = test_pool().await;
        let users = UsersService::new(pool);

        let created = users.upsert_from_identity(&identity(42, "old_name")).await.unwrap();
        assert!(created.id.starts_with("U_"));
        assert_eq!(created.tier(), TariffTier::Creator);

        let refreshed = users.upsert_from_identity(&identity(42, "new_name")).await.unwrap();
        assert_eq!(refreshed.id, created.id);
        assert_eq!(refreshed.username.as_deref(), Some("new_name"));

        let by_telegram = users.find_by_telegram_id(42).await.unwrap().unwrap();
        assert_eq!(by_telegram.id, created.id);
    }

    #[tokio::test]
    async fn test_telegram_login_then_me() {
        let (app, _pool) = test_app().await;
        let body = signed_widget_body(json!({
            "id": 777,
            "first_name": "Ann",
            "username": "ann",
            "photo_url": null,
            "auth_date": Utc::now().timestamp()
        }));

        let (status, login) = send(&app, json_request("POST", "/api/v1/auth/telegram", None, Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["token_type"], "bearer");
        assert_eq!(login["tariff"], "creator");
        let access_token = login["access_token"].as_str().unwrap();
        let claims = decode_access_token(access_token, TEST_JWT_SECRET).unwrap();
        assert_eq!(claims.sub, login["user_id"].as_str().unwrap());
        assert_eq!(claims.telegram_id, 777);

        let auth = format!("Bearer {}", access_token);
        let (status, me) = send(&app, json_request("GET", "/api/v1/auth/me", Some(&auth), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["telegram_id"], 777);
        assert_eq!(me["username"], "ann");
        assert_eq!(me["quota"]["limit"], 5);
        assert_eq!(me["quota"]["used"], 0);
        assert_eq!(me["quota"]["remaining"], 5);
    }

    #[tokio::test]
    async fn test_telegram_login_with_init_data() {
        let (app, _pool) = test_app().await;
        let auth_date = Utc::now().timestamp().to_string();
        let payload = AuthPayload::new()
            .with("auth_date", auth_date.as_str())
            .with("query_id", "AAH")
            .with("id", 99_i64)
            .with("first_name", "Bo");
        let hash = sign(&payload, TEST_BOT_TOKEN.as_bytes());
        let user = urlencoding::encode(r#"{"id":99,"first_name":"Bo"}"#).into_owned();
        let init_data = format!("query_id=AAH&user={}&auth_date={}&hash={}", user, auth_date, hash);

        let (status, login) = send(
            &app,
            json_request("POST", "/api/v1/auth/telegram", None, Some(json!({"init_data": init_data}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(login["user_id"].as_str().unwrap().starts_with("U_"));
    }

    #[tokio::test]
    async fn test_telegram_login_rejects_bad_signature_and_stale_data() {
        let (app, _pool) = test_app().await;

        let mut tampered = signed_widget_body(json!({
            "id": 1,
            "first_name": "Ann",
            "auth_date": Utc::now().timestamp()
        }));
        tampered["first_name"] = json!("Eve");
        let (status, body) = send(&app, json_request("POST", "/api/v1/auth/telegram", None, Some(tampered))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid Telegram auth");

        let stale = signed_widget_body(json!({
            "id": 1,
            "first_name": "Ann",
            "auth_date": (Utc::now() - Duration::days(2)).timestamp()
        }));
        let (status, body) = send(&app, json_request("POST", "/api/v1/auth/telegram", None, Some(stale))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Telegram auth data expired");

        let unsigned = json!({"id": 1, "auth_date": Utc::now().timestamp()});
        let (status, _) = send(&app, json_request("POST", "/api/v1/auth/telegram", None, Some(unsigned))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authenticate_payload_requires_bot_token() {
        let payload = AuthPayload::new()
            .with("id", 1_i64)
            .with("auth_date", Utc::now().timestamp());
        let hash = sign(&payload, b"");
        let payload = payload.with("hash", hash.as_str());

        let err = services::authenticate_payload(&payload, "", 86_400, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_rejected_without_configured_bot_token() {
        let pool = test_pool().await;
        let mut state = test_state(pool.clone());
        let mut config = (*state.config).clone();
        config.telegram_bot_token = String::new();
        state.config = Arc::new(config);
        let app = crate::app_router(Arc::new(RwLock::new(state)));

        let mut body = json!({"id": 1, "first_name": "Eve", "auth_date": Utc::now().timestamp()});
        let payload = AuthPayload::from_json_object(body.as_object().unwrap());
        body["hash"] = json!(sign(&payload, b""));

        let (status, body) = send(&app, json_request("POST", "/api/v1/auth/telegram", None, Some(body))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid Telegram auth");

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[tokio::test]
    async fn test_me_requires_valid_token_for_existing_user() {
        let (app, pool) = test_app().await;

        let (status, body) = send(&app, json_request("GET", "/api/v1/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing auth");

        let (status, _) = send(&app, json_request("GET", "/api/v1/auth/me", Some("Bearer nope"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let user = insert_user(&pool, 5, TariffTier::Strategist).await;
        let auth = bearer_for(&user);
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(&pool)
            .await
            .unwrap();
        let (status, body) = send(&app, json_request("GET", "/api/v1/auth/me", Some(&auth), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "user not found");
    }

    #[tokio::test]
    async fn test_tariff_is_read_from_database_not_token() {
        let (app, pool) = test_app().await;
        let user = insert_user(&pool, 5, TariffTier::Creator).await;
        let auth = bearer_for(&user);

        sqlx::query("UPDATE users SET tariff = 'agency' WHERE id = ?")
            .bind(&user.id)
            .execute(&pool)
            .await
            .unwrap();

        let (_, me) = send(&app, json_request("GET", "/api/v1/auth/me", Some(&auth), None)).await;
        assert_eq!(me["tariff"], "agency");
        assert_eq!(me["quota"]["limit"], 999_999);
    }

    #[tokio::test]
    async fn test_dev_mode_bypasses_telegram_auth() {
        let pool = test_pool().await;
        let mut state = test_state(pool.clone());
        state.dev_mode.enabled = true;
        state.dev_mode.tariff = TariffTier::Strategist;
        let app = crate::app_router(Arc::new(RwLock::new(state)));

        let (status, me) = send(&app, json_request("GET", "/api/v1/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], crate::common::dev_mode::DEV_USER_ID);
        assert_eq!(me["tariff"], "strategist");

        // Second request reuses the same row
        let (status, _) = send(&app, json_request("GET", "/api/v1/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
