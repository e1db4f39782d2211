//! Authentication handlers

use axum::extract::{Extension, Json};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::extractors::AuthedUser;
use super::init_data::flatten_init_data;
use super::models::{AuthResponse, MeResponse};
use super::services::{authenticate_payload, UsersService};
use super::signature::AuthPayload;
use super::tokens::issue_access_token;
use crate::common::{ApiError, AppState};

const INIT_DATA_FIELD: &str = "init_data";

/// Turns a login request body into the payload to verify.
///
/// A body with an `init_data` string is a Mini App launch; anything else is
/// taken as login widget fields, with `null` values treated as not sent.
pub fn payload_from_body(body: &Value) -> Result<AuthPayload, ApiError> {
    let Value::Object(fields) = body else {
        return Err(ApiError::BadRequest("Expected a JSON object".to_string()));
    };

    match fields.get(INIT_DATA_FIELD) {
        Some(Value::String(init_data)) => Ok(flatten_init_data(init_data)?),
        Some(_) => Err(ApiError::BadRequest("init_data must be a string".to_string())),
        None => Ok(AuthPayload::from_json_object(fields).without_nulls()),
    }
}

/// POST /api/v1/auth/telegram
/// Authenticates a user with Telegram login data
///
/// # Request Body
/// ```json
/// { "id": 42, "first_name": "Ann", "auth_date": 1700000000, "hash": "<hex>" }
/// ```
/// or
/// ```json
/// { "init_data": "<Mini App initData query string>" }
/// ```
///
/// # Response
/// ```json
/// { "access_token": "<jwt>", "token_type": "bearer", "user_id": "U_...", "tariff": "creator" }
/// ```
pub async fn telegram_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<Value>,
) -> Result<Json<AuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let now = Utc::now();

    let payload = payload_from_body(&body)?;
    let identity = authenticate_payload(
        &payload,
        &state.config.telegram_bot_token,
        state.config.auth_max_age_secs,
        now,
    )
    .map_err(|e| {
        warn!(error = %e, "Telegram login rejected");
        e
    })?;

    let users = UsersService::new(state.db.clone());
    let user = users.upsert_from_identity(&identity).await?;

    let access_token = issue_access_token(
        &user.id,
        user.telegram_id,
        &state.config.jwt_secret,
        state.config.access_token_ttl_days,
        now,
    )?;

    info!(user_id = %user.id, tariff = %user.tier(), "User authentication successful via Telegram");

    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id: user.id.clone(),
        tariff: user.tier(),
    }))
}

/// GET /api/v1/auth/me
/// Returns the current user's profile, tariff and weekly quota usage
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<MeResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = UsersService::new(state.db.clone())
        .find_by_id(&authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let quota = state.quota_service.usage(&user.id, Utc::now()).await?;

    Ok(Json(MeResponse {
        id: user.id,
        telegram_id: user.telegram_id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        photo_url: user.photo_url,
        tariff: quota.tariff,
        quota,
    }))
}
