use super::models::SandwichComments;
use crate::common::ApiError;
use crate::services::{GenerationRequest, QuotaService, StaticFallbackGenerator, TextGenerator};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Text returned for a post when the generator fails
pub fn draft_post(topic: &str, style_hint: Option<&str>) -> String {
    format!(
        "[Draft] Post about: {}. Add style: {}.",
        topic.trim(),
        style_hint.unwrap_or("neutral")
    )
}

/// Splits generated text into items, one per non-empty line, dropping list
/// markers such as `1.`, `2)`, `-` and `•`
pub fn split_items(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let without_number = {
        let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let rest = &line[digits..];
        if digits > 0 && (rest.starts_with('.') || rest.starts_with(')')) {
            &rest[1..]
        } else {
            line
        }
    };
    without_number
        .trim_start_matches(['-', '*', '•'])
        .trim()
}

/// Exactly `count` items: generated ones first, the rest taken from `fallback`
/// at the same positions
pub fn fill_items(mut items: Vec<String>, fallback: &GenerationRequest, count: usize) -> Vec<String> {
    items.truncate(count);
    if items.len() < count {
        let extra = split_items(&StaticFallbackGenerator::render(fallback));
        items.extend(extra.into_iter().skip(items.len()).take(count - items.len()));
    }
    items
}

/// Runs quota-metered text generation
pub struct ContentService {
    generator: Arc<dyn TextGenerator>,
    quota: Arc<QuotaService>,
}

impl ContentService {
    pub fn new(generator: Arc<dyn TextGenerator>, quota: Arc<QuotaService>) -> Self {
        Self { generator, quota }
    }

    /// Consumes one weekly generation and then generates. A generator failure
    /// degrades to fallback text; the consumed generation is not refunded.
    async fn generate(
        &self,
        user_id: &str,
        request: &GenerationRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, ApiError> {
        let usage = self.quota.consume_generation(user_id, now).await?;
        info!(
            user_id = %user_id,
            kind = request.kind(),
            generator = self.generator.name(),
            remaining = usage.remaining,
            "Generating content"
        );

        match self.generator.generate(request).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    kind = request.kind(),
                    error = %e,
                    "Text generation failed, using fallback"
                );
                Ok(None)
            }
        }
    }

    pub async fn generate_post(
        &self,
        user_id: &str,
        topic: &str,
        style_hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, ApiError> {
        let request = GenerationRequest::Post {
            topic: topic.trim().to_string(),
            style_hint: style_hint.map(str::to_string),
        };

        let text = self
            .generate(user_id, &request, now)
            .await?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| draft_post(topic, style_hint));
        Ok(text)
    }

    pub async fn smart_sandwich(
        &self,
        user_id: &str,
        post_context: &str,
        now: DateTime<Utc>,
    ) -> Result<SandwichComments, ApiError> {
        let request = GenerationRequest::CommentSandwich {
            post_context: post_context.trim().to_string(),
        };
        let items = self.generate_items(user_id, &request, 3, now).await?;

        let mut parts = items.into_iter();
        let mut next = || parts.next().unwrap_or_default();
        Ok(SandwichComments {
            first: next(),
            second: next(),
            third: next(),
        })
    }

    pub async fn reputation_templates(
        &self,
        user_id: &str,
        negative_comment: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, ApiError> {
        let request = GenerationRequest::ReputationReplies {
            negative_comment: negative_comment.trim().to_string(),
        };
        self.generate_items(user_id, &request, 3, now).await
    }

    pub async fn personal_replies(
        &self,
        user_id: &str,
        base_comment: &str,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, ApiError> {
        let request = GenerationRequest::PersonalReplies {
            base_comment: base_comment.trim().to_string(),
            count,
        };
        self.generate_items(user_id, &request, count, now).await
    }

    async fn generate_items(
        &self,
        user_id: &str,
        request: &GenerationRequest,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, ApiError> {
        let items = self
            .generate(user_id, request, now)
            .await?
            .map(|text| split_items(&text))
            .unwrap_or_default();
        Ok(fill_items(items, request, count))
    }
}
