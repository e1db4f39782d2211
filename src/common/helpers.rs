// Helper functions for safe logging and input normalisation

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```ignore
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...CJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Normalises a Telegram username as typed by a user: trims whitespace and
/// strips every leading `@`
pub fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

/// Case-insensitive key used when matching usernames across tables
pub fn username_key(raw: &str) -> String {
    normalize_username(raw).to_lowercase()
}

/// Current time as RFC 3339, the format every timestamp column uses
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// True when `e` is a UNIQUE constraint failure
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}
