use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Channel {
    pub id: String,
    pub owner_id: String,
    pub telegram_channel_id: i64,
    pub username: Option<String>,
    pub title: Option<String>,
    pub subscribers_count: Option<i64>,
    pub raw_metadata: Option<String>, // JSON blob as received on connect
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Public view used by search results and the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelSummary {
    pub id: String,
    pub title: Option<String>,
    pub username: Option<String>,
    pub subscribers_count: Option<i64>,
}

impl From<&Channel> for ChannelSummary {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id.clone(),
            title: channel.title.clone(),
            username: channel.username.clone(),
            subscribers_count: channel.subscribers_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectChannelRequest {
    pub telegram_channel_id: i64,
    pub username: Option<String>,
    pub title: Option<String>,
    pub subscribers_count: Option<i64>,
    pub raw_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectChannelResponse {
    pub channel_id: String,
    pub title: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchChannelsQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const MAX_SEARCH_LIMIT: i64 = 50;
