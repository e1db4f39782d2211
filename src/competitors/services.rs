use super::models::{
    AdActivity, AddCompetitorRequest, AudienceOverlap, Competitor, RecordAdActivityRequest,
    MAX_ADS_LISTED,
};
use crate::common::{
    generate_ad_activity_id, generate_competitor_id, is_unique_violation, normalize_username,
    now_rfc3339, ApiError, TariffTier, Validator,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Integer mean of known subscriber counts and float mean of known ERs;
/// both are zero when nothing is known
pub fn niche_averages(competitors: &[Competitor]) -> (i64, f64) {
    let subscribers: Vec<i64> = competitors
        .iter()
        .filter_map(|c| c.subscribers_count)
        .collect();
    let ers: Vec<f64> = competitors.iter().filter_map(|c| c.er_estimate).collect();

    let avg_subscribers = if subscribers.is_empty() {
        0
    } else {
        subscribers.iter().sum::<i64>() / subscribers.len() as i64
    };
    let avg_er = if ers.is_empty() {
        0.0
    } else {
        ers.iter().sum::<f64>() / ers.len() as f64
    };

    (avg_subscribers, avg_er)
}

fn competitor_not_found() -> ApiError {
    ApiError::NotFound("Competitor not found".to_string())
}

fn already_added() -> ApiError {
    ApiError::BadRequest("Competitor already added".to_string())
}

pub struct CompetitorsService {
    db: SqlitePool,
}

impl CompetitorsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Competitors of `owner_id`, optionally narrowed to one of their channels
    pub async fn list(
        &self,
        owner_id: &str,
        channel_id: Option<&str>,
    ) -> Result<Vec<Competitor>, ApiError> {
        let competitors = match channel_id {
            Some(channel_id) => {
                sqlx::query_as::<_, Competitor>(
                    "SELECT * FROM competitors WHERE owner_id = ? AND channel_id = ? ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .bind(channel_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Competitor>(
                    "SELECT * FROM competitors WHERE owner_id = ? ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(competitors)
    }

    pub async fn find_owned(&self, owner_id: &str, competitor_id: &str) -> Result<Competitor, ApiError> {
        sqlx::query_as::<_, Competitor>("SELECT * FROM competitors WHERE id = ? AND owner_id = ?")
            .bind(competitor_id)
            .bind(owner_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(competitor_not_found)
    }

    pub async fn count_owned(&self, owner_id: &str) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM competitors WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    /// Adds a competitor to an owned channel within the tariff competitor cap.
    /// The cap counts competitors across all of the owner's channels.
    /// The caller is responsible for checking channel ownership.
    pub async fn add(
        &self,
        owner_id: &str,
        tier: TariffTier,
        request: AddCompetitorRequest,
    ) -> Result<Competitor, ApiError> {
        request.validate(&request).into_result()?;

        let max_competitors = tier.max_competitors();
        let cap_reached =
            || ApiError::Forbidden(format!("Tariff limit: max {} competitors", max_competitors));

        if self.count_owned(owner_id).await? >= max_competitors {
            return Err(cap_reached());
        }

        let username = normalize_username(&request.telegram_username);
        let duplicate: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM competitors
            WHERE owner_id = ? AND channel_id = ? AND telegram_username = ? COLLATE NOCASE
            "#,
        )
        .bind(owner_id)
        .bind(&request.channel_id)
        .bind(&username)
        .fetch_optional(&self.db)
        .await?;
        if duplicate.is_some() {
            return Err(already_added());
        }

        let competitor_id = generate_competitor_id();
        let now = now_rfc3339();
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let inserted = sqlx::query(
            r#"
            INSERT INTO competitors (
                id, owner_id, channel_id, telegram_username, title, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?
            WHERE (SELECT COUNT(*) FROM competitors WHERE owner_id = ?) < ?
            "#,
        )
        .bind(&competitor_id)
        .bind(owner_id)
        .bind(&request.channel_id)
        .bind(&username)
        .bind(&title)
        .bind(&now)
        .bind(&now)
        .bind(owner_id)
        .bind(max_competitors)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                already_added()
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        if inserted.rows_affected() == 0 {
            warn!(owner_id = %owner_id, "Competitor cap reached during concurrent add");
            return Err(cap_reached());
        }

        info!(
            competitor_id = %competitor_id,
            channel_id = %request.channel_id,
            username = %username,
            "Competitor added"
        );

        self.find_owned(owner_id, &competitor_id).await
    }

    /// Records a detected ad placement of an owned competitor
    pub async fn record_ad_activity(
        &self,
        owner_id: &str,
        competitor_id: &str,
        request: RecordAdActivityRequest,
        now: DateTime<Utc>,
    ) -> Result<AdActivity, ApiError> {
        let competitor = self.find_owned(owner_id, competitor_id).await?;
        request.validate(&request).into_result()?;

        let activity = AdActivity {
            id: generate_ad_activity_id(),
            competitor_id: competitor.id,
            detected_at: request.detected_at.unwrap_or(now).to_rfc3339(),
            description: request.description.filter(|d| !d.trim().is_empty()),
            post_url: request.post_url,
        };

        sqlx::query(
            r#"
            INSERT INTO competitor_ad_activities (id, competitor_id, detected_at, description, post_url)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&activity.id)
        .bind(&activity.competitor_id)
        .bind(&activity.detected_at)
        .bind(&activity.description)
        .bind(&activity.post_url)
        .execute(&self.db)
        .await?;

        info!(
            activity_id = %activity.id,
            competitor_id = %activity.competitor_id,
            "Ad activity recorded"
        );

        Ok(activity)
    }

    /// Latest ad activity of the channel's competitors, newest first. When
    /// `competitor_id` is given it must be a competitor of that channel.
    pub async fn ad_activities(
        &self,
        owner_id: &str,
        channel_id: &str,
        competitor_id: Option<&str>,
    ) -> Result<Vec<AdActivity>, ApiError> {
        if let Some(competitor_id) = competitor_id {
            let competitor = self.find_owned(owner_id, competitor_id).await?;
            if competitor.channel_id != channel_id {
                return Err(competitor_not_found());
            }
        }

        let activities = sqlx::query_as::<_, AdActivity>(
            r#"
            SELECT a.id, a.competitor_id, a.detected_at, a.description, a.post_url
            FROM competitor_ad_activities a
            JOIN competitors c ON c.id = a.competitor_id
            WHERE c.owner_id = ? AND c.channel_id = ? AND (? IS NULL OR c.id = ?)
            ORDER BY a.detected_at DESC, a.id DESC
            LIMIT ?
            "#,
        )
        .bind(owner_id)
        .bind(channel_id)
        .bind(competitor_id)
        .bind(competitor_id)
        .bind(MAX_ADS_LISTED)
        .fetch_all(&self.db)
        .await?;

        Ok(activities)
    }

    /// One entry per competitor of the channel; estimates stay empty until
    /// audience data is collected
    pub async fn audience_overlap(
        &self,
        owner_id: &str,
        channel_id: &str,
    ) -> Result<Vec<AudienceOverlap>, ApiError> {
        Ok(self
            .list(owner_id, Some(channel_id))
            .await?
            .into_iter()
            .map(|c| AudienceOverlap {
                competitor_id: c.id,
                competitor_username: c.telegram_username,
                competitor_title: c.title,
                overlap_estimate: None,
                came_from_you_estimate: None,
            })
            .collect())
    }
}
