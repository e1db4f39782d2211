use super::heatmap::{DAYS, HOURS};
use super::models::{
    ChannelStats, DashboardResponse, HeatmapCell, HeatmapResponse, PsychographicResponse,
    RecordSnapshotRequest, StatsSnapshot,
};
use super::services::{estimated_psychographic, AnalyticsService};
use crate::auth::AuthedUser;
use crate::channels::models::ChannelSummary;
use crate::channels::ChannelsService;
use crate::common::{ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// GET /api/v1/analytics/dashboard - Caller's channels and tariff
pub async fn get_dashboard(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let app_state = state.read().await;
    let channels = ChannelsService::new(app_state.db.clone())
        .list_owned(&user.id)
        .await?;

    Ok(Json(DashboardResponse {
        channels: channels.iter().map(ChannelSummary::from).collect(),
        tariff: user.tariff,
    }))
}

/// GET /api/v1/analytics/channel/:id - Subscriber growth and ER over the last 7 days
pub async fn get_channel_stats(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(channel_id): Path<String>,
) -> Result<Json<ChannelStats>, ApiError> {
    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &channel_id)
        .await?;

    let stats = AnalyticsService::new(app_state.db.clone())
        .channel_stats(&channel, Utc::now())
        .await?;

    Ok(Json(stats))
}

/// POST /api/v1/analytics/channel/:id/snapshots - Record a daily or hourly stats snapshot
pub async fn record_snapshot(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(channel_id): Path<String>,
    Json(request): Json<RecordSnapshotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &channel_id)
        .await?;

    let snapshot: StatsSnapshot = AnalyticsService::new(app_state.db.clone())
        .record_snapshot(&channel, request, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/v1/analytics/channel/:id/heatmap - Best posting and reply hours
pub async fn get_heatmap(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(channel_id): Path<String>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &channel_id)
        .await?;

    let heatmap = AnalyticsService::new(app_state.db.clone())
        .heatmap(&channel.id)
        .await?;

    let mut cells = Vec::with_capacity(DAYS * HOURS);
    for (day_of_week, row) in heatmap.scores.iter().enumerate() {
        for (hour_utc, score) in row.iter().enumerate() {
            cells.push(HeatmapCell {
                day_of_week,
                hour_utc,
                score: *score,
            });
        }
    }

    Ok(Json(HeatmapResponse {
        channel_id: channel.id,
        cells,
        best_post_hour_utc: heatmap.best_post_hour,
        best_reply_hour_utc: heatmap.best_reply_hour,
        observed_posts: heatmap.observed_posts,
    }))
}

/// GET /api/v1/analytics/channel/:id/psychographic - Estimated audience profile
pub async fn get_psychographic(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(channel_id): Path<String>,
) -> Result<Json<PsychographicResponse>, ApiError> {
    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &channel_id)
        .await?;

    Ok(Json(estimated_psychographic(&channel.id)))
}
