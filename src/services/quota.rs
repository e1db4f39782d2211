// src/services/quota.rs
//! Weekly content generation quota
//!
//! Usage is tracked per user as a counter plus the instant the current period
//! ends. Periods roll lazily: the first request after `period_reset_at` zeroes
//! the counter and opens a new 7-day window anchored at that request.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::common::{ApiError, TariffTier};

pub const QUOTA_PERIOD_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserQuotaState {
    pub generations_used_this_period: i64,
    pub period_reset_at: Option<DateTime<Utc>>,
}

/// The tier limit is already used up for the current period.
///
/// `state` is the state after any lazy reset and must still be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("weekly generation limit ({limit}) reached")]
pub struct QuotaExceeded {
    pub limit: i64,
    pub state: UserQuotaState,
}

/// True when the stored period is missing or over
pub fn needs_reset(state: &UserQuotaState, now: DateTime<Utc>) -> bool {
    match state.period_reset_at {
        None => true,
        Some(reset_at) => now >= reset_at,
    }
}

/// Consumes one generation for `tier` at `now`
pub fn check_and_consume(
    state: UserQuotaState,
    tier: TariffTier,
    now: DateTime<Utc>,
) -> Result<UserQuotaState, QuotaExceeded> {
    let mut state = state;

    if needs_reset(&state, now) {
        state.generations_used_this_period = 0;
        state.period_reset_at = Some(now + Duration::days(QUOTA_PERIOD_DAYS));
    }

    let limit = tier.weekly_generation_limit();
    if state.generations_used_this_period >= limit {
        return Err(QuotaExceeded { limit, state });
    }

    state.generations_used_this_period += 1;
    Ok(state)
}

/// Quota snapshot returned to clients
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuotaUsage {
    pub tariff: TariffTier,
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    /// `None` until the first generation of a new period
    pub resets_at: Option<String>,
}

impl QuotaUsage {
    /// Read-only view of `state` at `now`, applying the lazy reset without persisting it
    pub fn view(state: &UserQuotaState, tier: TariffTier, now: DateTime<Utc>) -> Self {
        let (used, resets_at) = if needs_reset(state, now) {
            (0, None)
        } else {
            (
                state.generations_used_this_period,
                state.period_reset_at.map(|t| t.to_rfc3339()),
            )
        };
        let limit = tier.weekly_generation_limit();
        Self {
            tariff: tier,
            used,
            limit,
            remaining: (limit - used).max(0),
            resets_at,
        }
    }
}

/// Parses a stored RFC 3339 timestamp; unreadable values count as "no period"
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            warn!(value = %raw, error = %e, "Unreadable quota reset timestamp, treating as expired");
            None
        }
    }
}

type QuotaRow = (String, i64, Option<String>);

/// Persists quota state for users; all writes run under an exclusive database lock
#[derive(Debug, Clone)]
pub struct QuotaService {
    db: SqlitePool,
}

impl QuotaService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Loads the stored quota state and tier of a user
    pub async fn load(&self, user_id: &str) -> Result<(UserQuotaState, TariffTier), ApiError> {
        let mut conn = self.db.acquire().await?;
        load_state(&mut conn, user_id).await
    }

    /// Current usage for display
    pub async fn usage(&self, user_id: &str, now: DateTime<Utc>) -> Result<QuotaUsage, ApiError> {
        let (state, tier) = self.load(user_id).await?;
        Ok(QuotaUsage::view(&state, tier, now))
    }

    /// Consumes one generation for `user_id`.
    ///
    /// The read-modify-write runs inside `BEGIN IMMEDIATE`, which takes the
    /// database write lock before the read, so concurrent requests for the same
    /// user are serialised. Returns 429 via `QuotaExceeded` when the limit is hit.
    pub async fn consume_generation(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<QuotaUsage, ApiError> {
        let db = self.db.clone();
        let user_id = user_id.to_string();

        // Detached so a cancelled request cannot return a connection to the
        // pool with the transaction still open
        tokio::spawn(async move { consume_in_transaction(&db, &user_id, now).await })
            .await
            .map_err(|e| ApiError::InternalServer(format!("quota task failed: {}", e)))?
    }
}

async fn load_state(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<(UserQuotaState, TariffTier), ApiError> {
    let row: Option<QuotaRow> = sqlx::query_as(
        r#"
        SELECT tariff, content_generations_used_this_week, content_week_reset_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let (tariff, used, reset_at) =
        row.ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let state = UserQuotaState {
        generations_used_this_period: used.max(0),
        period_reset_at: parse_timestamp(reset_at.as_deref()),
    };
    Ok((state, TariffTier::from_stored(&tariff)))
}

async fn consume_in_transaction(
    db: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<QuotaUsage, ApiError> {
    let mut conn = db.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    let outcome = match consume_locked(&mut conn, user_id, now).await {
        Ok(outcome) => outcome,
        Err(e) => {
            rollback(&mut conn).await;
            return Err(e);
        }
    };

    if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
        rollback(&mut conn).await;
        return Err(e.into());
    }

    let (state, tier) = outcome?;
    info!(
        user_id = %user_id,
        used = state.generations_used_this_period,
        limit = tier.weekly_generation_limit(),
        "Content generation quota consumed"
    );
    Ok(QuotaUsage::view(&state, tier, now))
}

async fn consume_locked(
    conn: &mut SqliteConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Result<(UserQuotaState, TariffTier), QuotaExceeded>, ApiError> {
    let (state, tier) = load_state(conn, user_id).await?;
    let result = check_and_consume(state, tier, now);

    let next = match &result {
        Ok(next) => *next,
        Err(exceeded) => {
            debug!(user_id = %user_id, limit = exceeded.limit, "Weekly generation limit reached");
            exceeded.state
        }
    };

    if next != state {
        sqlx::query(
            r#"
            UPDATE users
            SET content_generations_used_this_week = ?, content_week_reset_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(next.generations_used_this_period)
        .bind(next.period_reset_at.map(|t| t.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(result.map(|s| (s, tier)))
}

async fn rollback(conn: &mut SqliteConnection) {
    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
        warn!(error = %e, "Failed to roll back quota transaction");
    }
}
