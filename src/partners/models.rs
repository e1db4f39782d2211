use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_SCOUT_LIMIT: i64 = 5;
pub const MAX_SCOUT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct ScoutQuery {
    pub channel_id: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartnerSuggestion {
    pub telegram_username: String,
    pub title: String,
    pub subscribers_count: i64,
    pub er_estimate: f64,
    pub relevance_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoutResponse {
    pub channel_id: String,
    pub suggestions: Vec<PartnerSuggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationStatus {
    Pending,
    Accepted,
    Declined,
}

impl NegotiationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStatus::Pending => "pending",
            NegotiationStatus::Accepted => "accepted",
            NegotiationStatus::Declined => "declined",
        }
    }
}

/// A negotiation row joined with the title of the sending channel
#[derive(Debug, Clone, FromRow)]
pub struct NegotiationRecord {
    pub id: String,
    pub from_user_id: String,
    pub from_channel_id: String,
    pub to_channel_username: String,
    pub proposed_text: Option<String>,
    pub status: String,
    pub to_user_id: Option<String>,
    pub created_at: Option<String>,
    pub from_channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNegotiationRequest {
    pub from_channel_id: String,
    pub to_channel_username: String,
    pub proposed_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NegotiationOut {
    pub id: String,
    pub from_channel_id: String,
    pub to_channel_username: String,
    pub proposed_text: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
    pub from_channel_title: Option<String>,
}

impl From<NegotiationRecord> for NegotiationOut {
    fn from(record: NegotiationRecord) -> Self {
        Self {
            id: record.id,
            from_channel_id: record.from_channel_id,
            to_channel_username: record.to_channel_username,
            proposed_text: record.proposed_text,
            status: record.status,
            created_at: record.created_at,
            from_channel_title: record.from_channel_title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Sent,
    Received,
}

#[derive(Debug, Deserialize)]
pub struct NegotiationListQuery {
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NegotiationListResponse {
    pub items: Vec<NegotiationOut>,
    pub direction: Direction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NegotiationStatusResponse {
    pub status: NegotiationStatus,
}
