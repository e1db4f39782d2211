use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Competitor {
    pub id: String,
    pub owner_id: String,
    pub channel_id: String,
    pub telegram_username: Option<String>,
    pub telegram_channel_id: Option<i64>,
    pub title: Option<String>,
    pub subscribers_count: Option<i64>,
    pub er_estimate: Option<f64>,
    pub raw_metadata: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitorOut {
    pub id: String,
    pub channel_id: String,
    pub telegram_username: Option<String>,
    pub title: Option<String>,
    pub subscribers_count: Option<i64>,
    pub er_estimate: Option<f64>,
    pub created_at: Option<String>,
}

impl From<Competitor> for CompetitorOut {
    fn from(competitor: Competitor) -> Self {
        Self {
            id: competitor.id,
            channel_id: competitor.channel_id,
            telegram_username: competitor.telegram_username,
            title: competitor.title,
            subscribers_count: competitor.subscribers_count,
            er_estimate: competitor.er_estimate,
            created_at: competitor.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListCompetitorsQuery {
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCompetitorRequest {
    pub channel_id: String,
    pub telegram_username: String,
    pub title: Option<String>,
}

/// Query of the endpoints scoped to one owned channel
#[derive(Debug, Deserialize)]
pub struct ChannelScopeQuery {
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AdsTrackerQuery {
    pub channel_id: String,
    pub competitor_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkResponse {
    pub channel_id: String,
    pub your_subscribers: Option<i64>,
    pub your_er_estimate: f64,
    pub niche_avg_subscribers: i64,
    pub niche_avg_er: f64,
    pub competitors_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdActivity {
    pub id: String,
    pub competitor_id: String,
    pub detected_at: String,
    pub description: Option<String>,
    pub post_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecordAdActivityRequest {
    pub description: Option<String>,
    pub post_url: Option<String>,
    pub detected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdsTrackerResponse {
    pub activities: Vec<AdActivity>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudienceOverlap {
    pub competitor_id: String,
    pub competitor_username: Option<String>,
    pub competitor_title: Option<String>,
    pub overlap_estimate: Option<f64>,
    pub came_from_you_estimate: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudienceOverlapResponse {
    pub channel_id: String,
    pub overlaps: Vec<AudienceOverlap>,
}

pub const MAX_ADS_LISTED: i64 = 100;
