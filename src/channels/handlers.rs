use super::models::{
    ChannelSummary, ConnectChannelRequest, ConnectChannelResponse, SearchChannelsQuery,
    DEFAULT_SEARCH_LIMIT,
};
use super::services::ChannelsService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// GET /api/v1/channels/search?q=&limit= - Search the caller's channels
pub async fn search_channels(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<SearchChannelsQuery>,
) -> Result<Json<Vec<ChannelSummary>>, ApiError> {
    query.validate(&query).into_result()?;

    let app_state = state.read().await;
    let channels_service = ChannelsService::new(app_state.db.clone());

    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;
    let results = channels_service
        .search(&user.id, query.q.as_deref().unwrap_or_default(), limit)
        .await?;

    Ok(Json(results))
}

/// POST /api/v1/channels/connect - Connect a Telegram channel
pub async fn connect_channel(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<ConnectChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let channels_service = ChannelsService::new(app_state.db.clone());

    let channel = channels_service
        .connect(&user.id, user.tariff, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ConnectChannelResponse {
            channel_id: channel.id,
            title: channel.title,
            username: channel.username,
        }),
    ))
}
