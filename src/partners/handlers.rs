use super::models::{
    CreateNegotiationRequest, Direction, NegotiationListQuery, NegotiationListResponse,
    NegotiationOut, NegotiationStatus, NegotiationStatusResponse, ScoutQuery, ScoutResponse,
    DEFAULT_SCOUT_LIMIT,
};
use super::services::{scout_suggestions, NegotiationsService};
use crate::auth::AuthedUser;
use crate::channels::ChannelsService;
use crate::common::{ApiError, AppState, Validator};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// GET /api/v1/partners/scout?channel_id=&limit= - Suggested partner channels
pub async fn scout_partners(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<ScoutQuery>,
) -> Result<Json<ScoutResponse>, ApiError> {
    query.validate(&query).into_result()?;

    let app_state = state.read().await;
    let channel = ChannelsService::new(app_state.db.clone())
        .find_owned(&user.id, &query.channel_id)
        .await?;

    let limit = query.limit.unwrap_or(DEFAULT_SCOUT_LIMIT) as usize;
    Ok(Json(ScoutResponse {
        channel_id: channel.id,
        suggestions: scout_suggestions(limit),
    }))
}

/// POST /api/v1/partners/negotiation - Send a partnership request
pub async fn create_negotiation(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateNegotiationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let record = NegotiationsService::new(app_state.db.clone())
        .create(&user.id, user.tariff, request)
        .await?;

    Ok((StatusCode::CREATED, Json(NegotiationOut::from(record))))
}

/// GET /api/v1/partners/negotiation?direction=sent|received - List requests
pub async fn list_negotiations(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<NegotiationListQuery>,
) -> Result<Json<NegotiationListResponse>, ApiError> {
    let app_state = state.read().await;
    let service = NegotiationsService::new(app_state.db.clone());

    let records = match query.direction {
        Direction::Sent => service.list_sent(&user.id).await?,
        Direction::Received => service.list_received(&user.id).await?,
    };

    Ok(Json(NegotiationListResponse {
        items: records.into_iter().map(NegotiationOut::from).collect(),
        direction: query.direction,
    }))
}

/// POST /api/v1/partners/negotiation/:id/accept
pub async fn accept_negotiation(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(negotiation_id): Path<String>,
) -> Result<Json<NegotiationStatusResponse>, ApiError> {
    let app_state = state.read().await;
    NegotiationsService::new(app_state.db.clone())
        .accept(&user.id, &negotiation_id)
        .await?;

    Ok(Json(NegotiationStatusResponse {
        status: NegotiationStatus::Accepted,
    }))
}

/// POST /api/v1/partners/negotiation/:id/decline
pub async fn decline_negotiation(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(negotiation_id): Path<String>,
) -> Result<Json<NegotiationStatusResponse>, ApiError> {
    let app_state = state.read().await;
    NegotiationsService::new(app_state.db.clone())
        .decline(&user.id, &negotiation_id)
        .await?;

    Ok(Json(NegotiationStatusResponse {
        status: NegotiationStatus::Declined,
    }))
}
