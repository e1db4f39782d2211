use super::models::{Channel, ChannelSummary, ConnectChannelRequest};
use crate::common::{
    generate_channel_id, is_unique_violation, normalize_username, now_rfc3339, ApiError,
    TariffTier, Validator,
};
use sqlx::SqlitePool;
use tracing::{info, warn};

const CHANNEL_COLUMNS: &str = "id, owner_id, telegram_channel_id, username, title, subscribers_count, \
     raw_metadata, created_at, updated_at";

pub struct ChannelsService {
    db: SqlitePool,
}

impl ChannelsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Channels owned by `owner_id`, oldest first
    pub async fn list_owned(&self, owner_id: &str) -> Result<Vec<Channel>, ApiError> {
        let channels = sqlx::query_as::<_, Channel>(&format!(
            "SELECT {} FROM channels WHERE owner_id = ? ORDER BY created_at ASC, id ASC",
            CHANNEL_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(channels)
    }

    /// Loads a channel only if `owner_id` owns it; anything else is a 404
    pub async fn find_owned(&self, owner_id: &str, channel_id: &str) -> Result<Channel, ApiError> {
        sqlx::query_as::<_, Channel>(&format!(
            "SELECT {} FROM channels WHERE id = ? AND owner_id = ?",
            CHANNEL_COLUMNS
        ))
        .bind(channel_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(ApiError::channel_not_found)
    }

    pub async fn count_owned(&self, owner_id: &str) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM channels WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    /// Case-insensitive substring match over title and username of owned channels
    pub async fn search(
        &self,
        owner_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ChannelSummary>, ApiError> {
        let needle = query.trim().to_lowercase();
        let matches = self
            .list_owned(owner_id)
            .await?
            .iter()
            .filter(|c| {
                let hit = |field: &Option<String>| {
                    field
                        .as_deref()
                        .map_or(false, |v| v.to_lowercase().contains(&needle))
                };
                hit(&c.title) || hit(&c.username)
            })
            .take(limit)
            .map(ChannelSummary::from)
            .collect();

        Ok(matches)
    }

    /// Connects a Telegram channel for `owner_id` within the tariff channel cap
    pub async fn connect(
        &self,
        owner_id: &str,
        tier: TariffTier,
        request: ConnectChannelRequest,
    ) -> Result<Channel, ApiError> {
        let validation_result = request.validate(&request);
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let max_channels = tier.max_channels();
        let cap_reached =
            || ApiError::Forbidden(format!("Tariff limit: max {} channels", max_channels));

        if self.count_owned(owner_id).await? >= max_channels {
            return Err(cap_reached());
        }

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM channels WHERE telegram_channel_id = ?")
                .bind(request.telegram_channel_id)
                .fetch_optional(&self.db)
                .await?;
        if existing.is_some() {
            return Err(ApiError::BadRequest("Channel already connected".to_string()));
        }

        let channel_id = generate_channel_id();
        let now = now_rfc3339();
        let username = request
            .username
            .as_deref()
            .map(normalize_username)
            .filter(|u| !u.is_empty());
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let raw_metadata = request.raw_metadata.as_ref().map(|v| v.to_string());

        // The cap is re-checked inside the INSERT so concurrent connects cannot exceed it
        let inserted = sqlx::query(
            r#"
            INSERT INTO channels (
                id, owner_id, telegram_channel_id, username, title, subscribers_count,
                raw_metadata, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?
            WHERE (SELECT COUNT(*) FROM channels WHERE owner_id = ?) < ?
            "#,
        )
        .bind(&channel_id)
        .bind(owner_id)
        .bind(request.telegram_channel_id)
        .bind(&username)
        .bind(&title)
        .bind(request.subscribers_count)
        .bind(&raw_metadata)
        .bind(&now)
        .bind(&now)
        .bind(owner_id)
        .bind(max_channels)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::BadRequest("Channel already connected".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        if inserted.rows_affected() == 0 {
            warn!(owner_id = %owner_id, "Channel cap reached during concurrent connect");
            return Err(cap_reached());
        }

        info!(
            channel_id = %channel_id,
            owner_id = %owner_id,
            telegram_channel_id = request.telegram_channel_id,
            "Channel connected"
        );

        self.find_owned(owner_id, &channel_id).await
    }

    /// Lowercased usernames of every channel owned by `owner_id`
    pub async fn owned_username_keys(&self, owner_id: &str) -> Result<Vec<String>, ApiError> {
        Ok(self
            .list_owned(owner_id)
            .await?
            .iter()
            .filter_map(|c| c.username.as_deref())
            .map(crate::common::username_key)
            .filter(|k| !k.is_empty())
            .collect())
    }
}
