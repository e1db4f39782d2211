//! Access token issuing and validation (HS256 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{error, warn};

use super::models::Claims;
use crate::common::ApiError;

/// Issues an access token for `user_id` valid for `ttl_days` from `now`
pub fn issue_access_token(
    user_id: &str,
    telegram_id: i64,
    secret: &str,
    ttl_days: i64,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    let exp = (now + Duration::days(ttl_days)).timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        telegram_id,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error during authentication");
        ApiError::InternalServer("jwt error".to_string())
    })
}

/// Validates signature and expiry of an access token
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        warn!(error = %e, "JWT token validation failed");
        ApiError::Unauthorized("invalid token".to_string())
    })?;

    Ok(token_data.claims)
}

/// Strips an optional `Bearer ` prefix from an Authorization header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))
        .unwrap_or(header_value)
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
