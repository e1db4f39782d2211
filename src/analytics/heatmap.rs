//! Posting-time heatmap
//!
//! Each cell of the 7x24 grid (day 0 = Sunday, hours in UTC) blends what was
//! observed for the channel with a fixed curve of typical Telegram reading
//! activity. The observed score weighs as many times as posts were seen in
//! that cell; the baseline always weighs once, so sparse data stays close to
//! the curve.

pub const DAYS: usize = 7;
pub const HOURS: usize = 24;

/// Typical share of readers online per UTC hour, 0..100
const BASELINE_BY_HOUR: [f64; HOURS] = [
    10.0, 5.0, 3.0, 2.0, 2.0, 5.0, 15.0, 35.0, 55.0, 65.0, 60.0, 60.0, 70.0, 65.0, 55.0, 50.0,
    55.0, 65.0, 75.0, 90.0, 100.0, 95.0, 70.0, 35.0,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellObservation {
    pub posts: i64,
    pub views: i64,
    pub reactions: i64,
}

impl CellObservation {
    fn add(&mut self, other: &CellObservation) {
        self.posts = self.posts.saturating_add(other.posts.max(0));
        self.views = self.views.saturating_add(other.views.max(0));
        self.reactions = self.reactions.saturating_add(other.reactions.max(0));
    }

    fn engagement_per_post(&self) -> Option<f64> {
        if self.posts <= 0 {
            return None;
        }
        Some((self.views as f64 + self.reactions as f64) / self.posts as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub scores: [[f64; HOURS]; DAYS],
    pub best_post_hour: usize,
    pub best_reply_hour: usize,
    pub observed_posts: i64,
}

pub fn baseline(hour: usize) -> f64 {
    BASELINE_BY_HOUR[hour % HOURS]
}

/// Builds the heatmap from `(day_of_week, hour, observation)` tuples.
/// Out-of-range coordinates are ignored; repeated cells are summed.
pub fn build_heatmap(observations: &[(usize, usize, CellObservation)]) -> Heatmap {
    let mut grid = [[CellObservation::default(); HOURS]; DAYS];
    for (day, hour, obs) in observations {
        if *day < DAYS && *hour < HOURS {
            grid[*day][*hour].add(obs);
        }
    }

    let max_engagement = grid
        .iter()
        .flatten()
        .filter_map(CellObservation::engagement_per_post)
        .fold(0.0_f64, f64::max);

    let mut scores = [[0.0_f64; HOURS]; DAYS];
    let mut observed_posts: i64 = 0;
    for (day, row) in grid.iter().enumerate() {
        for (hour, cell) in row.iter().enumerate() {
            observed_posts = observed_posts.saturating_add(cell.posts);
            let base = baseline(hour);
            scores[day][hour] = match cell.engagement_per_post() {
                Some(engagement) if max_engagement > 0.0 => {
                    let observed = 100.0 * engagement / max_engagement;
                    let weight = cell.posts as f64;
                    round1((observed * weight + base) / (weight + 1.0))
                }
                Some(_) => round1(base / (cell.posts as f64 + 1.0)),
                None => base,
            };
        }
    }

    let best_post_hour = best_hour(&scores);
    Heatmap {
        scores,
        best_post_hour,
        best_reply_hour: (best_post_hour + 1) % HOURS,
        observed_posts,
    }
}

/// Hour with the highest column sum; ties go to the earliest hour
fn best_hour(scores: &[[f64; HOURS]; DAYS]) -> usize {
    let mut best = 0;
    let mut best_sum = f64::MIN;
    for hour in 0..HOURS {
        let sum: f64 = scores.iter().map(|row| row[hour]).sum();
        if sum > best_sum {
            best = hour;
            best_sum = sum;
        }
    }
    best
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
