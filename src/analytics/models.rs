use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

use crate::channels::models::ChannelSummary;
use crate::common::TariffTier;

pub const STATS_PERIOD_DAYS: i64 = 7;

/// Upper bound for posts, views, reactions and subscribers in a snapshot
pub const MAX_COUNTER: i64 = 1_000_000_000_000;

/// Epoch day of 9999-12-31
pub const MAX_EPOCH_DAY: i64 = 2_932_896;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Day,
    Hour,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Day => "day",
            PeriodType::Hour => "hour",
        }
    }
}

/// One row of `channel_stats_snapshots`.
///
/// Daily rows carry the day number since the Unix epoch in `period_value`;
/// hourly rows carry the UTC hour and `day_of_week` (0 = Sunday).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatsSnapshot {
    pub id: String,
    pub channel_id: String,
    pub period_type: String,
    pub period_value: i64,
    pub day_of_week: Option<i64>,
    pub posts_count: i64,
    pub total_views: i64,
    pub total_reactions: i64,
    pub subscribers_count: Option<i64>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordSnapshotRequest {
    pub period_type: PeriodType,
    pub period_value: Option<i64>,
    pub day_of_week: Option<i64>,
    #[serde(default)]
    pub posts_count: i64,
    #[serde(default)]
    pub total_views: i64,
    #[serde(default)]
    pub total_reactions: i64,
    pub subscribers_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub channels: Vec<ChannelSummary>,
    pub tariff: TariffTier,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChannelStats {
    pub channel_id: String,
    pub subscribers_count: Option<i64>,
    pub growth_7d: Option<f64>,
    pub er_estimate: Option<f64>,
    pub period_days: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub day_of_week: usize,
    pub hour_utc: usize,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeatmapResponse {
    pub channel_id: String,
    pub cells: Vec<HeatmapCell>,
    pub best_post_hour_utc: usize,
    pub best_reply_hour_utc: usize,
    pub observed_posts: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PsychographicResponse {
    pub channel_id: String,
    pub emotions: BTreeMap<String, f64>,
    pub types: BTreeMap<String, f64>,
    pub is_estimate: bool,
}
