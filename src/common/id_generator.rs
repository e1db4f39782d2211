// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates prefixed IDs such as `C_K7NP3XY2` for channels.
//! The alphabet excludes I, L, O and U so IDs survive being read aloud or retyped.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random characters after the prefix
const ID_LENGTH: usize = 8;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Connected Telegram channel (C_)
    Channel,
    /// Tracked competitor channel (R_) - R for Rival
    Competitor,
    /// Channel statistics snapshot (S_)
    Snapshot,
    /// Detected competitor ad activity (A_)
    AdActivity,
    /// Cross-promotion negotiation request (N_)
    Negotiation,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Channel => "C",
            EntityPrefix::Competitor => "R",
            EntityPrefix::Snapshot => "S",
            EntityPrefix::AdActivity => "A",
            EntityPrefix::Negotiation => "N",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID in the format "PREFIX_XXXXXXXX"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_channel_id() -> String {
    generate_id(EntityPrefix::Channel)
}

pub fn generate_competitor_id() -> String {
    generate_id(EntityPrefix::Competitor)
}

pub fn generate_snapshot_id() -> String {
    generate_id(EntityPrefix::Snapshot)
}

pub fn generate_ad_activity_id() -> String {
    generate_id(EntityPrefix::AdActivity)
}

pub fn generate_negotiation_id() -> String {
    generate_id(EntityPrefix::Negotiation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let channel_id = generate_channel_id();
        assert!(channel_id.starts_with("C_"));
        assert_eq!(channel_id.len(), 2 + ID_LENGTH);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_user_id();
        let random_part = &id[2..];

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            assert!(ids.insert(generate_competitor_id()), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_all_prefixes() {
        assert!(generate_user_id().starts_with("U_"));
        assert!(generate_channel_id().starts_with("C_"));
        assert!(generate_competitor_id().starts_with("R_"));
        assert!(generate_snapshot_id().starts_with("S_"));
        assert!(generate_ad_activity_id().starts_with("A_"));
        assert!(generate_negotiation_id().starts_with("N_"));
    }
}
