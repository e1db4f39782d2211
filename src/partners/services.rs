use super::models::{
    CreateNegotiationRequest, NegotiationRecord, NegotiationStatus, PartnerSuggestion,
};
use crate::channels::ChannelsService;
use crate::common::{
    generate_negotiation_id, normalize_username, now_rfc3339, ApiError, TariffTier, Validator,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, warn};

const NEGOTIATION_SELECT: &str = r#"
    SELECT n.id, n.from_user_id, n.from_channel_id, n.to_channel_username, n.proposed_text,
           n.status, n.to_user_id, n.created_at, c.title AS from_channel_title
    FROM negotiation_requests n
    LEFT JOIN channels c ON c.id = n.from_channel_id
"#;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Placeholder partner suggestions until a channel catalogue is wired in
pub fn scout_suggestions(limit: usize) -> Vec<PartnerSuggestion> {
    (1..=limit)
        .map(|i| {
            let n = i as f64;
            PartnerSuggestion {
                telegram_username: format!("niche_channel_{}", i),
                title: format!("Канал в вашей нише {}", i),
                subscribers_count: 5_000 + i as i64 * 1_000,
                er_estimate: round_to(0.03 + n * 0.005, 4),
                relevance_score: round_to(0.9 - n * 0.05, 2),
            }
        })
        .collect()
}

fn request_not_found() -> ApiError {
    ApiError::NotFound("Request not found".to_string())
}

pub struct NegotiationsService {
    db: SqlitePool,
}

impl NegotiationsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn count_pending_sent(&self, user_id: &str) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM negotiation_requests WHERE from_user_id = ? AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    /// Sends a partnership request from an owned channel to another channel by username
    pub async fn create(
        &self,
        user_id: &str,
        tier: TariffTier,
        request: CreateNegotiationRequest,
    ) -> Result<NegotiationRecord, ApiError> {
        if !tier.allows_negotiations() {
            return Err(ApiError::Forbidden(
                "Available on Strategist or Agency tariff".to_string(),
            ));
        }

        let channel = ChannelsService::new(self.db.clone())
            .find_owned(user_id, &request.from_channel_id)
            .await?;

        request.validate(&request).into_result()?;

        let max_pending = tier.max_pending_negotiations();
        let limit_reached = |max: i64| {
            ApiError::TooManyRequests(format!("Limit {} active negotiations", max))
        };
        if let Some(max) = max_pending {
            if self.count_pending_sent(user_id).await? >= max {
                return Err(limit_reached(max));
            }
        }

        let negotiation_id = generate_negotiation_id();
        let now = now_rfc3339();
        let to_username = normalize_username(&request.to_channel_username);
        let proposed_text = request
            .proposed_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let inserted = sqlx::query(
            r#"
            INSERT INTO negotiation_requests (
                id, from_user_id, from_channel_id, to_channel_username, proposed_text,
                status, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, 'pending', ?, ?
            WHERE ? IS NULL OR (
                SELECT COUNT(*) FROM negotiation_requests
                WHERE from_user_id = ? AND status = 'pending'
            ) < ?
            "#,
        )
        .bind(&negotiation_id)
        .bind(user_id)
        .bind(&channel.id)
        .bind(&to_username)
        .bind(&proposed_text)
        .bind(&now)
        .bind(&now)
        .bind(max_pending)
        .bind(user_id)
        .bind(max_pending)
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() == 0 {
            let max = max_pending.unwrap_or_default();
            warn!(user_id = %user_id, "Pending negotiation limit reached during concurrent create");
            return Err(limit_reached(max));
        }

        info!(
            negotiation_id = %negotiation_id,
            from_channel_id = %channel.id,
            to_channel_username = %to_username,
            "Negotiation request sent"
        );

        self.find(&negotiation_id).await?.ok_or_else(request_not_found)
    }

    pub async fn find(&self, negotiation_id: &str) -> Result<Option<NegotiationRecord>, ApiError> {
        let record = sqlx::query_as::<_, NegotiationRecord>(&format!(
            "{} WHERE n.id = ?",
            NEGOTIATION_SELECT
        ))
        .bind(negotiation_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    pub async fn list_sent(&self, user_id: &str) -> Result<Vec<NegotiationRecord>, ApiError> {
        let records = sqlx::query_as::<_, NegotiationRecord>(&format!(
            "{} WHERE n.from_user_id = ? ORDER BY n.created_at DESC, n.id DESC",
            NEGOTIATION_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(records)
    }

    /// Assigns unclaimed requests addressed to any of the user's channel
    /// usernames (case-insensitive) to the user. Returns how many were claimed.
    pub async fn claim_received(&self, user_id: &str) -> Result<u64, ApiError> {
        let keys = ChannelsService::new(self.db.clone())
            .owned_username_keys(user_id)
            .await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE negotiation_requests SET to_user_id = ");
        builder.push_bind(user_id);
        builder.push(", updated_at = ");
        builder.push_bind(now_rfc3339());
        builder.push(" WHERE to_user_id IS NULL AND LOWER(to_channel_username) IN (");
        let mut separated = builder.separated(", ");
        for key in &keys {
            separated.push_bind(key.as_str());
        }
        separated.push_unseparated(")");

        let claimed = builder.build().execute(&self.db).await?.rows_affected();
        if claimed > 0 {
            info!(user_id = %user_id, claimed = claimed, "Claimed incoming negotiation requests");
        }
        Ok(claimed)
    }

    pub async fn list_received(&self, user_id: &str) -> Result<Vec<NegotiationRecord>, ApiError> {
        self.claim_received(user_id).await?;

        let records = sqlx::query_as::<_, NegotiationRecord>(&format!(
            "{} WHERE n.to_user_id = ? ORDER BY n.created_at DESC, n.id DESC",
            NEGOTIATION_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(records)
    }

    /// Accepts a pending request addressed to the user
    pub async fn accept(&self, user_id: &str, negotiation_id: &str) -> Result<(), ApiError> {
        self.claim_received(user_id).await?;

        let record = self
            .find(negotiation_id)
            .await?
            .filter(|r| r.to_user_id.as_deref() == Some(user_id))
            .ok_or_else(request_not_found)?;

        self.transition(&record, NegotiationStatus::Accepted).await
    }

    /// Declines a pending request; the receiver and the sender may both do so
    pub async fn decline(&self, user_id: &str, negotiation_id: &str) -> Result<(), ApiError> {
        self.claim_received(user_id).await?;

        let record = self
            .find(negotiation_id)
            .await?
            .filter(|r| r.to_user_id.as_deref() == Some(user_id) || r.from_user_id == user_id)
            .ok_or_else(request_not_found)?;

        self.transition(&record, NegotiationStatus::Declined).await
    }

    async fn transition(
        &self,
        record: &NegotiationRecord,
        target: NegotiationStatus,
    ) -> Result<(), ApiError> {
        let already_closed = |status: &str| {
            ApiError::BadRequest(format!("Request is already {}", status))
        };
        if record.status != NegotiationStatus::Pending.as_str() {
            return Err(already_closed(&record.status));
        }

        let updated = sqlx::query(
            "UPDATE negotiation_requests SET status = ?, updated_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(target.as_str())
        .bind(now_rfc3339())
        .bind(&record.id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM negotiation_requests WHERE id = ?")
                    .bind(&record.id)
                    .fetch_optional(&self.db)
                    .await?;
            return Err(already_closed(current.as_deref().unwrap_or("closed")));
        }

        info!(
            negotiation_id = %record.id,
            status = target.as_str(),
            "Negotiation request updated"
        );
        Ok(())
    }
}
