use super::models::{
    GeneratePostRequest, GeneratePostResponse, MassReplyRequest, MassReplyResponse,
    ReputationTemplatesRequest, ReputationTemplatesResponse, SmartSandwichRequest,
    SmartSandwichResponse,
};
use super::services::ContentService;
use crate::auth::AuthedUser;
use crate::channels::ChannelsService;
use crate::common::{ApiError, AppState, Validator};
use axum::{extract::Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

fn content_service(app_state: &AppState) -> ContentService {
    ContentService::new(
        app_state.text_generator.clone(),
        app_state.quota_service.clone(),
    )
}

/// POST /api/v1/content/generate-post - Write a channel post on a topic
pub async fn generate_post(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<GeneratePostRequest>,
) -> Result<Json<GeneratePostResponse>, ApiError> {
    request.validate(&request).into_result()?;

    let app_state = state.read().await;
    if let Some(channel_id) = &request.channel_id {
        ChannelsService::new(app_state.db.clone())
            .find_owned(&user.id, channel_id)
            .await?;
    }

    let now = Utc::now();
    let text = content_service(&app_state)
        .generate_post(&user.id, &request.topic, request.style_hint.as_deref(), now)
        .await?;

    Ok(Json(GeneratePostResponse {
        text,
        generated_at: now.to_rfc3339(),
    }))
}

/// POST /api/v1/content/smart-sandwich - Three comments to seed a discussion
pub async fn smart_sandwich(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<SmartSandwichRequest>,
) -> Result<Json<SmartSandwichResponse>, ApiError> {
    request.validate(&request).into_result()?;

    let app_state = state.read().await;
    let comments = content_service(&app_state)
        .smart_sandwich(&user.id, &request.post_context, Utc::now())
        .await?;

    Ok(Json(SmartSandwichResponse { comments }))
}

/// POST /api/v1/content/reputation-templates - Replies to a negative comment
pub async fn reputation_templates(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<ReputationTemplatesRequest>,
) -> Result<Json<ReputationTemplatesResponse>, ApiError> {
    request.validate(&request).into_result()?;

    let app_state = state.read().await;
    let templates = content_service(&app_state)
        .reputation_templates(&user.id, &request.negative_comment, Utc::now())
        .await?;

    Ok(Json(ReputationTemplatesResponse { templates }))
}

/// POST /api/v1/content/mass-personal-reply - Personalised variants of one reply
pub async fn mass_personal_reply(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<MassReplyRequest>,
) -> Result<Json<MassReplyResponse>, ApiError> {
    request.validate(&request).into_result()?;

    let app_state = state.read().await;
    let replies = content_service(&app_state)
        .personal_replies(&user.id, &request.base_comment, request.count as usize, Utc::now())
        .await?;

    Ok(Json(MassReplyResponse { replies }))
}
