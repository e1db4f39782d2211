use super::heatmap::{build_heatmap, CellObservation, Heatmap};
use super::models::{
    ChannelStats, PeriodType, PsychographicResponse, RecordSnapshotRequest, StatsSnapshot,
    STATS_PERIOD_DAYS,
};
use crate::channels::Channel;
use crate::common::{generate_snapshot_id, now_rfc3339, ApiError, Validator};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::info;

const SECONDS_PER_DAY: i64 = 86_400;

/// Day number since 1970-01-01 (UTC)
pub fn epoch_day(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(SECONDS_PER_DAY)
}

/// Weekday of an epoch day, 0 = Sunday (1970-01-01 was a Thursday)
pub fn day_of_week(epoch_day: i64) -> i64 {
    (epoch_day.rem_euclid(7) + 4) % 7
}

/// Growth and ER over daily snapshots; both need at least two days of data.
///
/// Growth is the subscriber delta between the first and last day. ER is total
/// reactions over total views.
pub fn compute_stats(daily: &[StatsSnapshot]) -> (Option<f64>, Option<f64>) {
    if daily.len() < 2 {
        return (None, None);
    }

    let mut ordered: Vec<&StatsSnapshot> = daily.iter().collect();
    ordered.sort_by_key(|s| s.period_value);

    let first_subs = ordered.iter().find_map(|s| s.subscribers_count);
    let last_subs = ordered.iter().rev().find_map(|s| s.subscribers_count);
    let growth = match (first_subs, last_subs) {
        (Some(first), Some(last)) => Some(last as f64 - first as f64),
        _ => None,
    };

    let views: i128 = ordered.iter().map(|s| i128::from(s.total_views)).sum();
    let reactions: i128 = ordered.iter().map(|s| i128::from(s.total_reactions)).sum();
    let er = if views > 0 {
        Some(((reactions as f64 / views as f64) * 10_000.0).round() / 10_000.0)
    } else {
        None
    };

    (growth, er)
}

pub struct AnalyticsService {
    db: SqlitePool,
}

impl AnalyticsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Records a snapshot. A daily snapshot replaces the one stored for the same
    /// day; hourly snapshots accumulate.
    pub async fn record_snapshot(
        &self,
        channel: &Channel,
        request: RecordSnapshotRequest,
        now: DateTime<Utc>,
    ) -> Result<StatsSnapshot, ApiError> {
        let validation_result = request.validate(&request);
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let (period_value, day) = match request.period_type {
            PeriodType::Day => {
                let value = request.period_value.unwrap_or_else(|| epoch_day(now));
                (value, day_of_week(value))
            }
            PeriodType::Hour => (
                request.period_value.unwrap_or_default(),
                request.day_of_week.unwrap_or_default(),
            ),
        };

        let snapshot_id = generate_snapshot_id();
        let mut tx = self.db.begin().await?;

        if request.period_type == PeriodType::Day {
            sqlx::query(
                "DELETE FROM channel_stats_snapshots WHERE channel_id = ? AND period_type = 'day' AND period_value = ?",
            )
            .bind(&channel.id)
            .bind(period_value)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO channel_stats_snapshots (
                id, channel_id, period_type, period_value, day_of_week,
                posts_count, total_views, total_reactions, subscribers_count, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&snapshot_id)
        .bind(&channel.id)
        .bind(request.period_type.as_str())
        .bind(period_value)
        .bind(day)
        .bind(request.posts_count)
        .bind(request.total_views)
        .bind(request.total_reactions)
        .bind(request.subscribers_count)
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        if let Some(subscribers) = request.subscribers_count {
            sqlx::query("UPDATE channels SET subscribers_count = ?, updated_at = ? WHERE id = ?")
                .bind(subscribers)
                .bind(now_rfc3339())
                .bind(&channel.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            channel_id = %channel.id,
            period_type = request.period_type.as_str(),
            period_value = period_value,
            "Recorded channel stats snapshot"
        );

        let snapshot = sqlx::query_as::<_, StatsSnapshot>(
            "SELECT * FROM channel_stats_snapshots WHERE id = ?",
        )
        .bind(&snapshot_id)
        .fetch_one(&self.db)
        .await?;

        Ok(snapshot)
    }

    /// Daily snapshots of the last `STATS_PERIOD_DAYS` days including today
    pub async fn recent_daily_snapshots(
        &self,
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<StatsSnapshot>, ApiError> {
        let since = epoch_day(now) - (STATS_PERIOD_DAYS - 1);
        let rows = sqlx::query_as::<_, StatsSnapshot>(
            r#"
            SELECT * FROM channel_stats_snapshots
            WHERE channel_id = ? AND period_type = 'day' AND period_value >= ?
            ORDER BY period_value ASC
            "#,
        )
        .bind(channel_id)
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    pub async fn channel_stats(
        &self,
        channel: &Channel,
        now: DateTime<Utc>,
    ) -> Result<ChannelStats, ApiError> {
        let daily = self.recent_daily_snapshots(&channel.id, now).await?;
        let (growth_7d, er_estimate) = compute_stats(&daily);

        Ok(ChannelStats {
            channel_id: channel.id.clone(),
            subscribers_count: channel.subscribers_count,
            growth_7d,
            er_estimate,
            period_days: STATS_PERIOD_DAYS,
        })
    }

    pub async fn heatmap(&self, channel_id: &str) -> Result<Heatmap, ApiError> {
        let rows: Vec<(Option<i64>, i64, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT day_of_week, period_value, posts_count, total_views, total_reactions
            FROM channel_stats_snapshots
            WHERE channel_id = ? AND period_type = 'hour'
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.db)
        .await?;

        let observations: Vec<(usize, usize, CellObservation)> = rows
            .into_iter()
            .filter_map(|(day, hour, posts, views, reactions)| {
                let day = usize::try_from(day?).ok()?;
                let hour = usize::try_from(hour).ok()?;
                Some((day, hour, CellObservation { posts, views, reactions }))
            })
            .collect();

        Ok(build_heatmap(&observations))
    }
}

/// Audience profile shown until real audience research is available
pub fn estimated_psychographic(channel_id: &str) -> PsychographicResponse {
    let share = |pairs: &[(&str, f64)]| -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    };

    PsychographicResponse {
        channel_id: channel_id.to_string(),
        emotions: share(&[
            ("interest", 0.34),
            ("joy", 0.22),
            ("trust", 0.18),
            ("surprise", 0.12),
            ("skepticism", 0.09),
            ("irritation", 0.05),
        ]),
        types: share(&[
            ("readers", 0.58),
            ("commenters", 0.21),
            ("sharers", 0.13),
            ("critics", 0.08),
        ]),
        is_estimate: true,
    }
}
