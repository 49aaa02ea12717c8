use serde::{Deserialize, Serialize};

/// Classification of a single keystroke's inter-key latency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SpeedTier {
    Perfect,
    Best,
    Good,
    Lame,
}

impl SpeedTier {
    /// Cosmetic upgrade level associated with the tier (used by the
    /// per-character upgrade query).
    pub fn upgrade_level(self) -> u8 {
        match self {
            SpeedTier::Perfect => 3,
            SpeedTier::Best => 2,
            SpeedTier::Good => 1,
            SpeedTier::Lame => 0,
        }
    }
}

/// Ascending latency thresholds in milliseconds. A latency strictly below
/// `perfect_ms` is Perfect, below `best_ms` Best, below `good_ms` Good,
/// anything else Lame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedThresholds {
    pub perfect_ms: u64,
    pub best_ms: u64,
    pub good_ms: u64,
    /// Above this, combo decays by one step regardless of tier.
    pub stale_ms: u64,
    /// Assumed latency for the first keystroke of a session, which has no
    /// prior timestamp to measure against.
    pub neutral_first_ms: u64,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            perfect_ms: 120,
            best_ms: 180,
            good_ms: 250,
            stale_ms: 600,
            neutral_first_ms: 200,
        }
    }
}

/// Map a measured inter-keystroke latency to its speed tier.
pub fn classify(latency_ms: u64, thresholds: &SpeedThresholds) -> SpeedTier {
    if latency_ms < thresholds.perfect_ms {
        SpeedTier::Perfect
    } else if latency_ms < thresholds.best_ms {
        SpeedTier::Best
    } else if latency_ms < thresholds.good_ms {
        SpeedTier::Good
    } else {
        SpeedTier::Lame
    }
}
