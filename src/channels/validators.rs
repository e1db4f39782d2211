use super::models::{ConnectChannelRequest, SearchChannelsQuery, MAX_SEARCH_LIMIT};
use crate::common::{ValidationResult, Validator};

impl Validator<ConnectChannelRequest> for ConnectChannelRequest {
    fn validate(&self, data: &ConnectChannelRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.telegram_channel_id == 0 {
            result.add_error("telegram_channel_id", "Telegram channel id is required");
        }

        if let Some(username) = &data.username {
            if username.chars().count() > 255 {
                result.add_error("username", "Username must not exceed 255 characters");
            }
        }

        if let Some(title) = &data.title {
            if title.chars().count() > 512 {
                result.add_error("title", "Title must not exceed 512 characters");
            }
        }

        if matches!(data.subscribers_count, Some(n) if n < 0) {
            result.add_error("subscribers_count", "Subscribers count must not be negative");
        }

        result
    }
}

impl Validator<SearchChannelsQuery> for SearchChannelsQuery {
    fn validate(&self, data: &SearchChannelsQuery) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.q.as_deref().map_or(true, |q| q.trim().is_empty()) {
            result.add_error("q", "Search query is required");
        }

        if let Some(limit) = data.limit {
            if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
                result.add_error("limit", "Limit must be between 1 and 50");
            }
        }

        result
    }
}
