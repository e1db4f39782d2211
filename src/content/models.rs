use serde::{Deserialize, Serialize};

pub const DEFAULT_REPLY_COUNT: i64 = 5;
pub const MAX_REPLY_COUNT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct GeneratePostRequest {
    pub topic: String,
    pub channel_id: Option<String>,
    pub style_hint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePostResponse {
    pub text: String,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SmartSandwichRequest {
    pub post_context: String,
}

/// Question, development and summary comments, posted in that order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SandwichComments {
    pub first: String,
    pub second: String,
    pub third: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SmartSandwichResponse {
    pub comments: SandwichComments,
}

#[derive(Debug, Deserialize)]
pub struct ReputationTemplatesRequest {
    pub negative_comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReputationTemplatesResponse {
    pub templates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MassReplyRequest {
    pub base_comment: String,
    #[serde(default = "default_reply_count")]
    pub count: i64,
}

fn default_reply_count() -> i64 {
    DEFAULT_REPLY_COUNT
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MassReplyResponse {
    pub replies: Vec<String>,
}
