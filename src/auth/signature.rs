// src/auth/signature.rs
//! Telegram login data signature verification
//!
//! Telegram signs login data with `HMAC-SHA256(SHA256(bot_token), data_check_string)`
//! where the data check string is every field except `hash`, rendered as
//! `key=value`, sorted by key and joined with `\n`.
//!
//! Docs: https://core.telegram.org/widgets/login#checking-authorization

use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Field carrying the hex-encoded signature
pub const HASH_FIELD: &str = "hash";

/// Length of a hex-encoded SHA-256 digest
const HEX_DIGEST_LEN: usize = 64;

/// The login data did not carry a valid signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid Telegram signature")]
pub struct InvalidSignature;

/// A single login data value. Telegram sends strings and integers; `Null`
/// covers fields a client sent explicitly empty.
///
/// `Null` renders as the empty string in the data-check string, not as
/// `None`. Login bodies drop null fields before verification, so this only
/// affects callers that keep them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValue {
    Text(String),
    Integer(i64),
    Null,
}

impl fmt::Display for AuthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthValue::Text(s) => f.write_str(s),
            AuthValue::Integer(n) => write!(f, "{}", n),
            AuthValue::Null => Ok(()),
        }
    }
}

impl AuthValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AuthValue::Null)
    }

    /// Integer view of the value; numeric strings are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AuthValue::Integer(n) => Some(*n),
            AuthValue::Text(s) => s.trim().parse().ok(),
            AuthValue::Null => None,
        }
    }

    /// Non-empty text view of the value
    pub fn as_text(&self) -> Option<String> {
        match self {
            AuthValue::Null => None,
            other => Some(other.to_string()).filter(|s| !s.is_empty()),
        }
    }

    /// Converts a JSON value the way it is stringified for signing
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AuthValue::Null,
            Value::String(s) => AuthValue::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AuthValue::Integer(i),
                None => AuthValue::Text(n.to_string()),
            },
            Value::Bool(b) => AuthValue::Text(b.to_string()),
            nested => AuthValue::Text(nested.to_string()),
        }
    }
}

impl From<&str> for AuthValue {
    fn from(s: &str) -> Self {
        AuthValue::Text(s.to_string())
    }
}

impl From<String> for AuthValue {
    fn from(s: String) -> Self {
        AuthValue::Text(s)
    }
}

impl From<i64> for AuthValue {
    fn from(n: i64) -> Self {
        AuthValue::Integer(n)
    }
}

/// Login data as received from a client, keyed by field name.
///
/// Keys are kept in a `BTreeMap`, so iteration order is the lexicographic
/// order the data check string needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthPayload {
    fields: BTreeMap<String, AuthValue>,
}

impl AuthPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<AuthValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<AuthValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AuthValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AuthValue> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a payload from a JSON object, keeping every key including nulls
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let fields = object
            .iter()
            .map(|(k, v)| (k.clone(), AuthValue::from_json(v)))
            .collect();
        Self { fields }
    }

    /// Drops null fields; used by callers that treat `null` as "not sent"
    pub fn without_nulls(mut self) -> Self {
        self.fields.retain(|_, v| !v.is_null());
        self
    }
}

/// Builds the canonical `key=value\n...` string over every field except `hash`
pub fn data_check_string(payload: &AuthPayload) -> String {
    payload
        .fields
        .iter()
        .filter(|(key, _)| key.as_str() != HASH_FIELD)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn signing_mac(secret: &[u8], message: &str) -> HmacSha256 {
    let signing_key = Sha256::digest(secret);
    let mut mac = <HmacSha256 as Mac>::new_from_slice(&signing_key)
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac
}

/// Computes the lowercase hex signature Telegram would attach to `payload`
#[cfg(test)]
pub fn sign(payload: &AuthPayload, secret: &[u8]) -> String {
    let mac = signing_mac(secret, &data_check_string(payload));
    hex::encode(mac.finalize().into_bytes())
}

/// Returns true iff `payload["hash"]` is the signature of the remaining fields.
///
/// The digest comparison runs in constant time. A missing or malformed hash is
/// a plain `false`.
pub fn verify(payload: &AuthPayload, secret: &[u8]) -> bool {
    let Some(received) = payload.get(HASH_FIELD).and_then(AuthValue::as_text) else {
        return false;
    };

    // Shape check only looks at the attacker-supplied value
    if received.len() != HEX_DIGEST_LEN
        || !received
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }

    let Ok(expected) = hex::decode(&received) else {
        return false;
    };

    signing_mac(secret, &data_check_string(payload))
        .verify_slice(&expected)
        .is_ok()
}

/// `verify` as a typed outcome
pub fn verify_payload(payload: &AuthPayload, secret: &[u8]) -> Result<(), InvalidSignature> {
    if verify(payload, secret) {
        Ok(())
    } else {
        Err(InvalidSignature)
    }
}
