//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::services::UsersService;
use super::tokens::{bearer_token, decode_access_token};
use crate::common::{safe_token_log, ApiError, AppState, TariffTier};

/// Authenticated user extractor
///
/// Validates the `Authorization: Bearer <jwt>` header and loads the user from
/// the database, so tariff changes take effect without a new token.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub telegram_id: i64,
    pub tariff: TariffTier,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();
        let users = UsersService::new(app_state.db.clone());

        // DEV MODE: Bypass authentication completely
        if app_state.dev_mode.is_enabled() {
            let dev_user = users.ensure_dev_user(&app_state.dev_mode).await?;
            debug!(user_id = %dev_user.id, "DEV MODE: Authentication bypassed");
            return Ok(AuthedUser {
                tariff: dev_user.tier(),
                id: dev_user.id,
                telegram_id: dev_user.telegram_id,
            });
        }

        let Some(token) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
        else {
            warn!("Authentication failed: missing Authorization header");
            return Err(ApiError::Unauthorized("missing auth".into()));
        };

        let claims = decode_access_token(token, &app_state.config.jwt_secret).map_err(|e| {
            debug!(token = %safe_token_log(token), "Rejected access token");
            e
        })?;

        match users.find_by_id(&claims.sub).await? {
            Some(user) => {
                debug!(user_id = %user.id, "User authentication successful via extractor");
                Ok(AuthedUser {
                    tariff: user.tier(),
                    id: user.id,
                    telegram_id: user.telegram_id,
                })
            }
            None => {
                warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}
