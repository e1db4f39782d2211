// src/common/tariff.rs
//! Tariff tiers and the usage limits attached to each of them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription level of a user. Stored as lowercase text in `users.tariff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TariffTier {
    #[default]
    Creator,
    Strategist,
    Agency,
}

/// Stand-in for "no limit" on the agency tier
pub const AGENCY_WEEKLY_GENERATIONS: i64 = 999_999;

/// Pending outgoing negotiation requests allowed on the strategist tier
pub const STRATEGIST_PENDING_NEGOTIATIONS: i64 = 20;

impl TariffTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TariffTier::Creator => "creator",
            TariffTier::Strategist => "strategist",
            TariffTier::Agency => "agency",
        }
    }

    /// Parses a stored tariff; anything unrecognised is treated as the entry tier
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Content generations allowed per rolling week
    pub fn weekly_generation_limit(&self) -> i64 {
        match self {
            TariffTier::Creator => 5,
            TariffTier::Strategist => 100,
            TariffTier::Agency => AGENCY_WEEKLY_GENERATIONS,
        }
    }

    pub fn max_channels(&self) -> i64 {
        match self {
            TariffTier::Creator => 1,
            TariffTier::Strategist => 3,
            TariffTier::Agency => 10,
        }
    }

    pub fn max_competitors(&self) -> i64 {
        match self {
            TariffTier::Creator => 1,
            TariffTier::Strategist => 15,
            TariffTier::Agency => 50,
        }
    }

    pub fn allows_negotiations(&self) -> bool {
        matches!(self, TariffTier::Strategist | TariffTier::Agency)
    }

    /// Cap on pending outgoing negotiations, `None` when unlimited
    pub fn max_pending_negotiations(&self) -> Option<i64> {
        match self {
            TariffTier::Creator => Some(0),
            TariffTier::Strategist => Some(STRATEGIST_PENDING_NEGOTIATIONS),
            TariffTier::Agency => None,
        }
    }
}

impl fmt::Display for TariffTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TariffTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creator" => Ok(TariffTier::Creator),
            "strategist" => Ok(TariffTier::Strategist),
            "agency" => Ok(TariffTier::Agency),
            other => Err(format!("unknown tariff '{}'", other)),
        }
    }
}
