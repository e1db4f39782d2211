// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

const TABLES: &[&str] = &[
    "negotiation_requests",
    "competitor_ad_activities",
    "channel_stats_snapshots",
    "competitors",
    "channels",
    "users",
];

/// Run all database migrations
///
/// Tables are created if missing. Setting `RESET_DB=true` drops everything first.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_schema(pool).await?;

    info!("Database migration completed");
    Ok(())
}

/// Create every table and index; safe to call repeatedly
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_channel_tables(pool).await?;
    create_competitor_tables(pool).await?;
    create_partner_tables(pool).await?;
    create_indexes(pool).await?;
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            telegram_id INTEGER UNIQUE NOT NULL,
            username TEXT,
            first_name TEXT,
            last_name TEXT,
            photo_url TEXT,
            tariff TEXT NOT NULL DEFAULT 'creator',
            content_generations_used_this_week INTEGER NOT NULL DEFAULT 0,
            content_week_reset_at TEXT,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_channel_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channels (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            telegram_channel_id INTEGER UNIQUE NOT NULL,
            username TEXT,
            title TEXT,
            subscribers_count INTEGER,
            raw_metadata TEXT,
            created_at TEXT,
            updated_at TEXT,
            FOREIGN KEY(owner_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // period_type is 'day' (period_value = days since epoch) or 'hour'
    // (period_value = hour of day, day_of_week 0 = Sunday)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channel_stats_snapshots (
            id TEXT PRIMARY KEY,
            channel_id TEXT NOT NULL,
            period_type TEXT NOT NULL,
            period_value INTEGER NOT NULL,
            day_of_week INTEGER,
            posts_count INTEGER NOT NULL DEFAULT 0,
            total_views INTEGER NOT NULL DEFAULT 0,
            total_reactions INTEGER NOT NULL DEFAULT 0,
            subscribers_count INTEGER,
            created_at TEXT,
            FOREIGN KEY(channel_id) REFERENCES channels(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_competitor_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS competitors (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            channel_id TEXT NOT NULL,
            telegram_username TEXT,
            telegram_channel_id INTEGER,
            title TEXT,
            subscribers_count INTEGER,
            er_estimate REAL,
            raw_metadata TEXT,
            created_at TEXT,
            updated_at TEXT,
            FOREIGN KEY(owner_id) REFERENCES users(id),
            FOREIGN KEY(channel_id) REFERENCES channels(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS competitor_ad_activities (
            id TEXT PRIMARY KEY,
            competitor_id TEXT NOT NULL,
            detected_at TEXT NOT NULL,
            description TEXT,
            post_url TEXT,
            FOREIGN KEY(competitor_id) REFERENCES competitors(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_partner_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS negotiation_requests (
            id TEXT PRIMARY KEY,
            from_user_id TEXT NOT NULL,
            from_channel_id TEXT NOT NULL,
            to_channel_username TEXT NOT NULL,
            proposed_text TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            to_user_id TEXT,
            created_at TEXT,
            updated_at TEXT,
            FOREIGN KEY(from_user_id) REFERENCES users(id),
            FOREIGN KEY(from_channel_id) REFERENCES channels(id),
            FOREIGN KEY(to_user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_channels_owner ON channels(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_snapshots_channel ON channel_stats_snapshots(channel_id, period_type)",
        "CREATE INDEX IF NOT EXISTS idx_competitors_owner_channel ON competitors(owner_id, channel_id)",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_competitors_unique_username ON competitors(owner_id, channel_id, telegram_username COLLATE NOCASE)",
        "CREATE INDEX IF NOT EXISTS idx_ad_activities_competitor ON competitor_ad_activities(competitor_id)",
        "CREATE INDEX IF NOT EXISTS idx_negotiations_from_user ON negotiation_requests(from_user_id, status)",
        "CREATE INDEX IF NOT EXISTS idx_negotiations_to_username ON negotiation_requests(to_channel_username COLLATE NOCASE)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, TABLES.len() as i64);
    }
}
