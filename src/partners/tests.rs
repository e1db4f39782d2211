//! Tests for partners module
//!
//! These tests verify:
//! - Scout suggestions and limit validation
//! - Tariff rules for sending negotiation requests
//! - Matching received requests by channel username and status transitions

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{
        bearer_for, insert_channel, insert_user, json_request, send, test_app, test_pool,
    };
    use crate::common::{ApiError, TariffTier, Validator};
    use axum::http::StatusCode;
    use models::{CreateNegotiationRequest, ScoutQuery};
    use serde_json::json;
    use services::scout_suggestions;

    fn negotiation(from_channel_id: &str, to: &str) -> CreateNegotiationRequest {
        CreateNegotiationRequest {
            from_channel_id: from_channel_id.to_string(),
            to_channel_username: to.to_string(),
            proposed_text: Some("Mutual repost?".to_string()),
        }
    }

    #[test]
    fn test_scout_suggestions_shape() {
        let suggestions = scout_suggestions(3);
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].telegram_username, "niche_channel_1");
        assert_eq!(suggestions[0].title, "Канал в вашей нише 1");
        assert_eq!(suggestions[0].subscribers_count, 6_000);
        assert_eq!(suggestions[0].er_estimate, 0.035);
        assert_eq!(suggestions[0].relevance_score, 0.85);
        assert_eq!(suggestions[2].subscribers_count, 8_000);
        assert_eq!(suggestions[2].relevance_score, 0.75);
    }

    #[test]
    fn test_scout_limit_validation() {
        for (limit, valid) in [(None, true), (Some(1), true), (Some(10), true), (Some(0), false), (Some(11), false)] {
            let query = ScoutQuery {
                channel_id: "C_1".to_string(),
                limit,
            };
            assert_eq!(query.validate(&query).is_valid, valid, "{:?}", limit);
        }
    }

    #[tokio::test]
    async fn test_creator_cannot_negotiate() {
        let pool = test_pool().await;
        let user = insert_user(&pool, 1, TariffTier::Creator).await;
        let channel = insert_channel(&pool, &user.id, 10, "mine", None).await;

        let err = NegotiationsService::new(pool)
            .create(&user.id, TariffTier::Creator, negotiation(&channel.id, "partner"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref msg) if msg == "Available on Strategist or Agency tariff"));
    }

    #[tokio::test]
    async fn test_create_requires_owned_channel() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, 1, TariffTier::Strategist).await;
        let stranger = insert_user(&pool, 2, TariffTier::Strategist).await;
        let channel = insert_channel(&pool, &owner.id, 10, "mine", None).await;

        let err = NegotiationsService::new(pool)
            .create(&stranger.id, TariffTier::Strategist, negotiation(&channel.id, "partner"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Channel not found"));
    }

    #[tokio::test]
    async fn test_strategist_pending_limit() {
        let pool = test_pool().await;
        let user = insert_user(&pool, 1, TariffTier::Strategist).await;
        let channel = insert_channel(&pool, &user.id, 10, "mine", None).await;
        let service = NegotiationsService::new(pool);

        for i in 0..20 {
            service
                .create(&user.id, TariffTier::Strategist, negotiation(&channel.id, &format!("partner{}", i)))
                .await
                .unwrap();
        }
        let err = service
            .create(&user.id, TariffTier::Strategist, negotiation(&channel.id, "one_more"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TooManyRequests(ref msg) if msg == "Limit 20 active negotiations"));

        // Agency has no pending cap
        service
            .create(&user.id, TariffTier::Agency, negotiation(&channel.id, "one_more"))
            .await
            .unwrap();
        assert_eq!(service.count_pending_sent(&user.id).await.unwrap(), 21);
    }

    #[tokio::test]
    async fn test_received_requests_match_username_case_insensitively() {
        let pool = test_pool().await;
        let sender = insert_user(&pool, 1, TariffTier::Strategist).await;
        let receiver = insert_user(&pool, 2, TariffTier::Creator).await;
        let bystander = insert_user(&pool, 3, TariffTier::Creator).await;
        let from = insert_channel(&pool, &sender.id, 10, "sender_channel", None).await;
        insert_channel(&pool, &receiver.id, 20, "PartnerChannel", None).await;
        let service = NegotiationsService::new(pool);

        let sent = service
            .create(&sender.id, TariffTier::Strategist, negotiation(&from.id, "@partnerchannel"))
            .await
            .unwrap();
        assert_eq!(sent.to_channel_username, "partnerchannel");
        assert_eq!(sent.from_channel_title.as_deref(), Some("Channel sender_channel"));
        assert!(sent.to_user_id.is_none());

        assert!(service.list_received(&bystander.id).await.unwrap().is_empty());

        let received = service.list_received(&receiver.id).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, sent.id);
        assert_eq!(received[0].to_user_id.as_deref(), Some(receiver.id.as_str()));

        let outgoing = service.list_sent(&sender.id).await.unwrap();
        assert_eq!(outgoing.len(), 1);
    }

    #[tokio::test]
    async fn test_accept_and_decline_rules() {
        let pool = test_pool().await;
        let sender = insert_user(&pool, 1, TariffTier::Agency).await;
        let receiver = insert_user(&pool, 2, TariffTier::Creator).await;
        let from = insert_channel(&pool, &sender.id, 10, "sender_channel", None).await;
        insert_channel(&pool, &receiver.id, 20, "partner", None).await;
        let service = NegotiationsService::new(pool);

        let first = service
            .create(&sender.id, TariffTier::Agency, negotiation(&from.id, "partner"))
            .await
            .unwrap();
        let second = service
            .create(&sender.id, TariffTier::Agency, negotiation(&from.id, "partner"))
            .await
            .unwrap();

        // The sender cannot accept their own request
        let err = service.accept(&sender.id, &first.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Request not found"));

        service.accept(&receiver.id, &first.id).await.unwrap();
        let err = service.decline(&receiver.id, &first.id).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg == "Request is already accepted"));

        service.decline(&sender.id, &second.id).await.unwrap();
        let record = service.find(&second.id).await.unwrap().unwrap();
        assert_eq!(record.status, "declined");
    }

    #[tokio::test]
    async fn test_negotiation_flow_over_http() {
        let (app, pool) = test_app().await;
        let sender = insert_user(&pool, 1, TariffTier::Strategist).await;
        let receiver = insert_user(&pool, 2, TariffTier::Creator).await;
        let from = insert_channel(&pool, &sender.id, 10, "sender_channel", None).await;
        insert_channel(&pool, &receiver.id, 20, "Partner", None).await;

        let uri = format!("/api/v1/partners/scout?channel_id={}", from.id);
        let (status, body) = send(&app, json_request("GET", &uri, Some(&bearer_for(&sender)), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suggestions"].as_array().map(Vec::len), Some(5));

        let uri = format!("/api/v1/partners/scout?channel_id={}&limit=11", from.id);
        let (status, _) = send(&app, json_request("GET", &uri, Some(&bearer_for(&sender)), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/partners/negotiation",
                Some(&bearer_for(&sender)),
                Some(json!({"from_channel_id": from.id, "to_channel_username": "@partner"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        let id = body["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("N_"));

        let (status, body) = send(
            &app,
            json_request(
                "GET",
                "/api/v1/partners/negotiation?direction=received",
                Some(&bearer_for(&receiver)),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["direction"], "received");
        assert_eq!(body["items"][0]["id"], id.as_str());

        let (_, body) = send(
            &app,
            json_request("GET", "/api/v1/partners/negotiation", Some(&bearer_for(&sender)), None),
        )
        .await;
        assert_eq!(body["direction"], "sent");
        assert_eq!(body["items"].as_array().map(Vec::len), Some(1));

        let uri = format!("/api/v1/partners/negotiation/{}/accept", id);
        let (status, body) = send(&app, json_request("POST", &uri, Some(&bearer_for(&receiver)), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "accepted");
    }
}
