// src/auth/init_data.rs
//! Telegram Mini App `initData` support
//!
//! A Mini App hands the backend its launch parameters as a URL query string,
//! e.g. `query_id=...&user=%7B%22id%22%3A42...%7D&auth_date=...&hash=...`.
//! The profile lives in the JSON-encoded `user` parameter. It is flattened
//! into the same field set a login widget would send before verification.

use serde_json::Value;
use tracing::debug;

use super::signature::{AuthPayload, AuthValue, InvalidSignature};

const USER_FIELD: &str = "user";

/// Decodes one form-urlencoded component (`+` means space)
fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

/// Splits a query string into decoded key/value pairs, skipping pairs without `=`
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => {
                    Some((decode_component(key)?, decode_component(value)?))
                }
                _ => None,
            }
        })
        .collect()
}

/// Flattens `initData` into a verifiable payload.
///
/// Every query parameter becomes a field. The `user` parameter must be a JSON
/// object; its members are lifted to the top level and do not overwrite
/// parameters of the same name. Malformed input is an `InvalidSignature`.
pub fn flatten_init_data(init_data: &str) -> Result<AuthPayload, InvalidSignature> {
    let mut payload = AuthPayload::new();
    for (key, value) in parse_query_string(init_data) {
        payload.insert(&key, value);
    }

    if let Some(AuthValue::Text(raw)) = payload.remove(USER_FIELD) {
        let user: Value = serde_json::from_str(&raw).map_err(|e| {
            debug!(error = %e, "initData user parameter is not valid JSON");
            InvalidSignature
        })?;
        let Value::Object(fields) = user else {
            debug!("initData user parameter is not a JSON object");
            return Err(InvalidSignature);
        };

        for (key, value) in &fields {
            if !payload.contains_key(key) {
                payload.insert(key, AuthValue::from_json(value));
            }
        }
    }

    if payload.is_empty() {
        return Err(InvalidSignature);
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::{sign, verify};

    #[test]
    fn test_parse_query_string_decodes_values() {
        let pairs = parse_query_string("a=1&b=hello%20world&c=x+y&broken&=skip");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "hello world".to_string()),
                ("c".to_string(), "x y".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_lifts_user_fields() {
        let init_data = "query_id=AAH&user=%7B%22id%22%3A42%2C%22first_name%22%3A%22Ann%22%2C%22is_premium%22%3Atrue%7D&auth_date=1700000000&hash=abc";
        let payload = flatten_init_data(init_data).unwrap();

        assert_eq!(payload.get("id"), Some(&AuthValue::Integer(42)));
        assert_eq!(payload.get("first_name"), Some(&AuthValue::Text("Ann".into())));
        assert_eq!(payload.get("is_premium"), Some(&AuthValue::Text("true".into())));
        assert_eq!(
            payload.get("auth_date"),
            Some(&AuthValue::Text("1700000000".into()))
        );
        assert_eq!(payload.get("hash"), Some(&AuthValue::Text("abc".into())));
        assert!(!payload.contains_key("user"));
    }

    #[test]
    fn test_top_level_params_win_over_user_fields() {
        let init_data = "auth_date=1&user=%7B%22auth_date%22%3A2%7D";
        let payload = flatten_init_data(init_data).unwrap();
        assert_eq!(payload.get("auth_date"), Some(&AuthValue::Text("1".into())));
    }

    #[test]
    fn test_malformed_user_is_invalid_signature() {
        assert_eq!(
            flatten_init_data("user=not-json&hash=abc"),
            Err(InvalidSignature)
        );
        assert_eq!(flatten_init_data("user=%5B1%2C2%5D"), Err(InvalidSignature));
        assert_eq!(flatten_init_data(""), Err(InvalidSignature));
    }

    #[test]
    fn test_flattened_payload_verifies_like_widget_payload() {
        let secret = b"bottoken";
        let widget = AuthPayload::new()
            .with("id", 42_i64)
            .with("first_name", "Ann")
            .with("auth_date", 1_700_000_000_i64);
        let hash = sign(&widget, secret);

        let init_data = format!(
            "user={}&auth_date=1700000000&hash={}",
            urlencoding::encode(r#"{"id":42,"first_name":"Ann"}"#),
            hash
        );
        let payload = flatten_init_data(&init_data).unwrap();
        assert!(verify(&payload, secret));
    }
}
