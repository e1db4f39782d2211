//! Telegram login verification and user persistence

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::models::{TelegramIdentity, User};
use super::signature::{verify_payload, AuthPayload, InvalidSignature};
use crate::common::dev_mode::DevModeConfig;
use crate::common::{generate_user_id, now_rfc3339, ApiError};

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, last_name, photo_url, tariff, \
     content_generations_used_this_week, content_week_reset_at, created_at, updated_at";

/// Extracts the profile from verified login data. `id` and `auth_date` are required.
pub fn identity_from_payload(payload: &AuthPayload) -> Result<TelegramIdentity, InvalidSignature> {
    let telegram_id = payload
        .get("id")
        .and_then(|v| v.as_i64())
        .ok_or(InvalidSignature)?;
    let auth_date = payload
        .get("auth_date")
        .and_then(|v| v.as_i64())
        .ok_or(InvalidSignature)?;
    let text = |key: &str| payload.get(key).and_then(|v| v.as_text());

    Ok(TelegramIdentity {
        telegram_id,
        username: text("username"),
        first_name: text("first_name"),
        last_name: text("last_name"),
        photo_url: text("photo_url"),
        auth_date,
    })
}

/// Rejects login data older than `max_age_secs`; 0 disables the check
pub fn check_auth_date(auth_date: i64, now: DateTime<Utc>, max_age_secs: i64) -> Result<(), ApiError> {
    if max_age_secs <= 0 {
        return Ok(());
    }
    let age = now.timestamp() - auth_date;
    if age > max_age_secs {
        warn!(age_secs = age, max_age_secs = max_age_secs, "Telegram auth data expired");
        return Err(ApiError::Unauthorized("Telegram auth data expired".to_string()));
    }
    Ok(())
}

/// Verifies the signature, then the freshness of `auth_date`.
/// Without a configured bot token every login is rejected.
pub fn authenticate_payload(
    payload: &AuthPayload,
    bot_token: &str,
    max_age_secs: i64,
    now: DateTime<Utc>,
) -> Result<TelegramIdentity, ApiError> {
    if bot_token.is_empty() {
        warn!("Telegram login attempted but TELEGRAM_BOT_TOKEN is not configured");
        return Err(InvalidSignature.into());
    }
    verify_payload(payload, bot_token.as_bytes()).map_err(|e| {
        debug!(fields = payload.len(), "Telegram signature mismatch");
        e
    })?;
    let identity = identity_from_payload(payload)?;
    check_auth_date(identity.auth_date, now, max_age_secs)?;
    Ok(identity)
}

pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE telegram_id = ?",
            USER_COLUMNS
        ))
        .bind(telegram_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Finds the user by Telegram id, creating it on first login.
    /// Profile fields are refreshed from the login data; tariff and quota are kept.
    pub async fn upsert_from_identity(&self, identity: &TelegramIdentity) -> Result<User, ApiError> {
        let now = now_rfc3339();
        let new_id = generate_user_id();

        sqlx::query(
            r#"
            INSERT INTO users (id, telegram_id, username, first_name, last_name, photo_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(telegram_id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                photo_url = excluded.photo_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&new_id)
        .bind(identity.telegram_id)
        .bind(&identity.username)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.photo_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        let user = self
            .find_by_telegram_id(identity.telegram_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user row missing after upsert".to_string()))?;

        if user.id == new_id {
            info!(user_id = %user.id, telegram_id = identity.telegram_id, "Created new user via Telegram login");
        } else {
            debug!(user_id = %user.id, "Refreshed profile of existing user");
        }

        Ok(user)
    }

    /// Inserts the fixed dev-mode user if it does not exist yet
    pub async fn ensure_dev_user(&self, dev_mode: &DevModeConfig) -> Result<User, ApiError> {
        if let Some(user) = self.find_by_id(crate::common::dev_mode::DEV_USER_ID).await? {
            return Ok(user);
        }

        let dev_user = dev_mode.create_dev_user();
        let now = now_rfc3339();
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (id, telegram_id, username, first_name, tariff, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&dev_user.id)
        .bind(dev_user.telegram_id)
        .bind(&dev_user.username)
        .bind(&dev_user.first_name)
        .bind(&dev_user.tariff)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(user_id = %dev_user.id, tariff = %dev_user.tariff, "DEV MODE: dev user created");

        self.find_by_id(&dev_user.id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("dev user could not be created".to_string()))
    }
}
