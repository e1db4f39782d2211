use super::models::{
    AddCompetitorRequest, AdsTrackerQuery, AdsTrackerResponse, AudienceOverlapResponse,
    BenchmarkResponse, ChannelScopeQuery, CompetitorOut, ListCompetitorsQuery,
    RecordAdActivityRequest,
};
use super::services::{niche_averages, CompetitorsService};
use crate::analytics::services::AnalyticsService;
use crate::auth::AuthedUser;
use crate::channels::ChannelsService;
use crate::common::{ApiError, AppState};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// GET /api/v1/competitors?channel_id= - List the caller's competitors
pub async fn list_competitors(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<ListCompetitorsQuery>,
) -> Result<Json<Vec<CompetitorOut>>, ApiError> {
    let app_state = state.read().await;

    if let Some(channel_id) = &query.channel_id {
        ChannelsService::new(app_state.db.clone())
            .find_owned(&user.id, channel_id)
            .await?;
    }

    let competitors = CompetitorsService::new(app_state.db.clone())
        .list(&user.id, query.channel_id.as_deref())
        .await?;

    Ok(Json(competitors.into_iter().map(CompetitorOut::from).collect()))
}

/// POST /api/v1/competitors - Track a competitor for one of the caller's channels
pub async fn add_competitor(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<AddCompetitorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &request.channel_id)
        .await?;

    let competitor = CompetitorsService::new(app_state.db.clone())
        .add(&user.id, user.tariff, request)
        .await?;

    Ok((StatusCode::CREATED, Json(CompetitorOut::from(competitor))))
}

/// GET /api/v1/competitors/benchmark?channel_id= - Own channel against the niche
pub async fn get_benchmark(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<ChannelScopeQuery>,
) -> Result<Json<BenchmarkResponse>, ApiError> {
    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &query.channel_id)
        .await?;

    let competitors = CompetitorsService::new(app_state.db.clone())
        .list(&user.id, Some(&channel.id))
        .await?;
    let (niche_avg_subscribers, niche_avg_er) = niche_averages(&competitors);

    let stats = AnalyticsService::new(app_state.db.clone())
        .channel_stats(&channel, Utc::now())
        .await?;

    Ok(Json(BenchmarkResponse {
        channel_id: channel.id,
        your_subscribers: channel.subscribers_count,
        your_er_estimate: stats.er_estimate.unwrap_or(0.0),
        niche_avg_subscribers,
        niche_avg_er,
        competitors_count: competitors.len(),
    }))
}

/// GET /api/v1/competitors/ads-tracker?channel_id=&competitor_id= - Detected ad placements
pub async fn get_ads_tracker(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<AdsTrackerQuery>,
) -> Result<Json<AdsTrackerResponse>, ApiError> {
    let app_state = state.read().await;
    ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &query.channel_id)
        .await?;

    let activities = CompetitorsService::new(app_state.db.clone())
        .ad_activities(&user.id, &query.channel_id, query.competitor_id.as_deref())
        .await?;

    Ok(Json(AdsTrackerResponse { activities }))
}

/// POST /api/v1/competitors/:id/ads - Record a detected ad placement
pub async fn record_ad_activity(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(competitor_id): Path<String>,
    Json(request): Json<RecordAdActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let activity = CompetitorsService::new(app_state.db.clone())
        .record_ad_activity(&user.id, &competitor_id, request, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

/// GET /api/v1/competitors/audience-overlap?channel_id= - Shared audience per competitor
pub async fn get_audience_overlap(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<ChannelScopeQuery>,
) -> Result<Json<AudienceOverlapResponse>, ApiError> {
    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &query.channel_id)
        .await?;

    let overlaps = CompetitorsService::new(app_state.db.clone())
        .audience_overlap(&user.id, &channel.id)
        .await?;

    Ok(Json(AudienceOverlapResponse {
        channel_id: channel.id,
        overlaps,
    }))
}
