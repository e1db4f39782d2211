// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body fields never written to the logs
const REDACTED_FIELDS: &[&str] = &["hash", "init_data", "access_token"];

/// Replaces secret fields at any depth with `"***"`
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("***".to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Renders a body for the logs; JSON is redacted, anything else is logged as-is
fn loggable_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<Value>(text) {
        Ok(mut json) => {
            redact(&mut json);
            Some(json.to_string())
        }
        Err(_) => Some(text.to_string()),
    }
}

/// Tags each request with an `x-request-id` (kept when the client sent one)
/// and logs request and response bodies at debug level
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (mut parts, body) = request.into_parts();
    let header_name = HeaderName::from_static(REQUEST_ID_HEADER);

    let request_id = parts
        .headers
        .get(&header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let header_value =
        HeaderValue::from_str(&request_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    parts.headers.insert(header_name.clone(), header_value.clone());

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(request_body) = loggable_body(&bytes) {
        debug!(
            request_id = %request_id,
            method = %parts.method,
            uri = %parts.uri,
            request_body = %request_body,
            "Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(response_body) = loggable_body(&bytes) {
        debug!(
            request_id = %request_id,
            status = %parts.status,
            response_body = %response_body,
            "Response"
        );
    }

    parts.headers.insert(header_name, header_value);
    Ok(Response::from_parts(parts, Body::from(bytes)))
}
