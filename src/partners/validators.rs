use super::models::{CreateNegotiationRequest, ScoutQuery, MAX_SCOUT_LIMIT};
use crate::common::{normalize_username, ValidationResult, Validator};

impl Validator<ScoutQuery> for ScoutQuery {
    fn validate(&self, data: &ScoutQuery) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(limit) = data.limit {
            if !(1..=MAX_SCOUT_LIMIT).contains(&limit) {
                result.add_error("limit", "Limit must be between 1 and 10");
            }
        }

        result
    }
}

impl Validator<CreateNegotiationRequest> for CreateNegotiationRequest {
    fn validate(&self, data: &CreateNegotiationRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.check_text(
            "to_channel_username",
            &normalize_username(&data.to_channel_username),
            255,
        );

        if let Some(text) = &data.proposed_text {
            if text.chars().count() > 4000 {
                result.add_error("proposed_text", "Proposed text must not exceed 4000 characters");
            }
        }

        result
    }
}
