use super::models::{PeriodType, RecordSnapshotRequest, MAX_COUNTER, MAX_EPOCH_DAY};
use crate::common::{ValidationResult, Validator};

impl Validator<RecordSnapshotRequest> for RecordSnapshotRequest {
    fn validate(&self, data: &RecordSnapshotRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let counters = [data.posts_count, data.total_views, data.total_reactions];
        if counters.iter().any(|c| *c < 0) {
            result.add_error("counters", "Counters must not be negative");
        } else if counters.iter().any(|c| *c > MAX_COUNTER) {
            result.add_error("counters", &format!("Counters must not exceed {}", MAX_COUNTER));
        }

        match data.subscribers_count {
            Some(n) if n < 0 => {
                result.add_error("subscribers_count", "Subscribers count must not be negative")
            }
            Some(n) if n > MAX_COUNTER => result.add_error(
                "subscribers_count",
                &format!("Subscribers count must not exceed {}", MAX_COUNTER),
            ),
            _ => {}
        }

        match data.period_type {
            PeriodType::Day => {
                if matches!(data.period_value, Some(v) if !(0..=MAX_EPOCH_DAY).contains(&v)) {
                    result.add_error(
                        "period_value",
                        &format!("Day number must be between 0 and {}", MAX_EPOCH_DAY),
                    );
                }
            }
            PeriodType::Hour => {
                match data.period_value {
                    Some(hour) if (0..24).contains(&hour) => {}
                    _ => result.add_error("period_value", "Hour must be between 0 and 23"),
                }
                match data.day_of_week {
                    Some(day) if (0..7).contains(&day) => {}
                    _ => result.add_error("day_of_week", "Day of week must be between 0 and 6"),
                }
            }
        }

        result
    }
}
