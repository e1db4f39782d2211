use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the channels router
pub fn channels_routes() -> Router {
    Router::new()
        .route("/api/v1/channels/search", get(handlers::search_channels))
        .route("/api/v1/channels/connect", post(handlers::connect_channel))
}
