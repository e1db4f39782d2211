//! Tests for content module
//!
//! These tests verify:
//! - Parsing of generated multi-part text
//! - Fallback text when the generator fails
//! - Weekly quota consumption through the HTTP endpoints

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{
        bearer_for, insert_channel, insert_user, json_request, send, test_app, test_pool,
    };
    use crate::common::TariffTier;
    use crate::services::text_generator::GenerationError;
    use crate::services::{GenerationRequest, QuotaService, TextGenerator};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;
    use services::{draft_post, fill_items, split_items, ContentService};
    use std::sync::Arc;

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::RateLimitExceeded)
        }
    }

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    async fn used_generations(pool: &sqlx::SqlitePool, user_id: &str) -> i64 {
        sqlx::query_scalar("SELECT content_generations_used_this_week FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_split_items_strips_list_markers() {
        let text = "1. First idea\n\n2) Second idea\n- Third idea\n• Fourth\n  * Fifth  \n2024 was a good year";
        assert_eq!(
            split_items(text),
            vec!["First idea", "Second idea", "Third idea", "Fourth", "Fifth", "2024 was a good year"]
        );
    }

    #[test]
    fn test_fill_items_pads_from_fallback_and_truncates() {
        let request = GenerationRequest::ReputationReplies {
            negative_comment: "Too many ads".to_string(),
        };
        let filled = fill_items(vec!["Only one".to_string()], &request, 3);
        assert_eq!(filled.len(), 3);
        assert_eq!(filled[0], "Only one");
        assert!(filled[1].contains("Too many ads"));

        let many = (0..5).map(|i| format!("reply {}", i)).collect();
        assert_eq!(fill_items(many, &request, 3).len(), 3);
    }

    #[test]
    fn test_draft_post_text() {
        assert_eq!(
            draft_post(" Rust tips ", None),
            "[Draft] Post about: Rust tips. Add style: neutral."
        );
        assert_eq!(
            draft_post("Rust tips", Some("funny")),
            "[Draft] Post about: Rust tips. Add style: funny."
        );
    }

    #[tokio::test]
    async fn test_failing_generator_degrades_to_fallback_but_consumes_quota() {
        let pool = test_pool().await;
        let user = insert_user(&pool, 1, TariffTier::Creator).await;
        let service = ContentService::new(
            Arc::new(FailingGenerator),
            Arc::new(QuotaService::new(pool.clone())),
        );

        let text = service
            .generate_post(&user.id, "Launch day", Some("bold"), Utc::now())
            .await
            .unwrap();
        assert_eq!(text, "[Draft] Post about: Launch day. Add style: bold.");

        let replies = service
            .personal_replies(&user.id, "Thanks!", 4, Utc::now())
            .await
            .unwrap();
        assert_eq!(replies.len(), 4);

        assert_eq!(used_generations(&pool, &user.id).await, 2);
    }

    #[tokio::test]
    async fn test_sandwich_uses_generated_lines() {
        let pool = test_pool().await;
        let user = insert_user(&pool, 1, TariffTier::Strategist).await;
        let service = ContentService::new(
            Arc::new(CannedGenerator("1. Why now?\n2. Because data.\n3. So act.")),
            Arc::new(QuotaService::new(pool)),
        );

        let comments = service
            .smart_sandwich(&user.id, "Post about growth", Utc::now())
            .await
            .unwrap();
        assert_eq!(comments.first, "Why now?");
        assert_eq!(comments.second, "Because data.");
        assert_eq!(comments.third, "So act.");
    }

    #[tokio::test]
    async fn test_quota_exhaustion_over_http() {
        let (app, pool) = test_app().await;
        let user = insert_user(&pool, 1, TariffTier::Creator).await;
        let auth = bearer_for(&user);

        for _ in 0..5 {
            let (status, body) = send(
                &app,
                json_request(
                    "POST",
                    "/api/v1/content/generate-post",
                    Some(&auth),
                    Some(json!({"topic": "Rust"})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["text"].as_str().unwrap().contains("Post about: Rust"));
            assert!(body["generated_at"].is_string());
        }

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/smart-sandwich",
                Some(&auth),
                Some(json!({"post_context": "Rust"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Weekly limit (5) reached. Upgrade for more.");
        assert_eq!(used_generations(&pool, &user.id).await, 5);
    }

    #[tokio::test]
    async fn test_rejected_requests_do_not_consume_quota() {
        let (app, pool) = test_app().await;
        let user = insert_user(&pool, 1, TariffTier::Creator).await;
        let other = insert_user(&pool, 2, TariffTier::Creator).await;
        let foreign = insert_channel(&pool, &other.id, 10, "theirs", None).await;
        let auth = bearer_for(&user);

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/generate-post",
                Some(&auth),
                Some(json!({"topic": "   "})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/generate-post",
                Some(&auth),
                Some(json!({"topic": "Rust", "channel_id": foreign.id})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Channel not found");

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/mass-personal-reply",
                Some(&auth),
                Some(json!({"base_comment": "Thanks", "count": 21})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(used_generations(&pool, &user.id).await, 0);
    }

    #[tokio::test]
    async fn test_multi_part_endpoints_return_requested_counts() {
        let (app, pool) = test_app().await;
        let user = insert_user(&pool, 1, TariffTier::Agency).await;
        let auth = bearer_for(&user);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/smart-sandwich",
                Some(&auth),
                Some(json!({"post_context": "We doubled our reach"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        for key in ["first", "second", "third"] {
            assert!(!body["comments"][key].as_str().unwrap().is_empty());
        }

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/reputation-templates",
                Some(&auth),
                Some(json!({"negative_comment": "Your channel is boring"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["templates"].as_array().map(Vec::len), Some(3));

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/mass-personal-reply",
                Some(&auth),
                Some(json!({"base_comment": "Glad you liked it", "count": 7})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let replies = body["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 7);
        assert!(replies.iter().all(|r| r.as_str().unwrap().contains("Glad you liked it")));

        assert_eq!(used_generations(&pool, &user.id).await, 3);
    }

    #[tokio::test]
    async fn test_content_requires_auth() {
        let (app, _pool) = test_app().await;
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/content/generate-post",
                None,
                Some(json!({"topic": "Rust"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
