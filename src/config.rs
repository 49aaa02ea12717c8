use crate::speed::{SpeedThresholds, SpeedTier};
use serde::{Deserialize, Serialize};

/// One value per speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable<T> {
    pub perfect: T,
    pub best: T,
    pub good: T,
    pub lame: T,
}

impl<T: Copy> TierTable<T> {
    pub fn get(&self, tier: SpeedTier) -> T {
        match tier {
            SpeedTier::Perfect => self.perfect,
            SpeedTier::Best => self.best,
            SpeedTier::Good => self.good,
            SpeedTier::Lame => self.lame,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub base: u32,
    pub speed_bonus: TierTable<u32>,
    pub speed_multiplier: TierTable<f64>,
    /// XP gained per keystroke = score / xp_per_score.
    pub xp_per_score: u32,
    /// XP required to advance from level N is N * level_xp_step.
    pub level_xp_step: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 50,
            speed_bonus: TierTable {
                perfect: 100,
                best: 50,
                good: 25,
                lame: 0,
            },
            speed_multiplier: TierTable {
                perfect: 2.0,
                best: 1.5,
                good: 1.2,
                lame: 1.0,
            },
            xp_per_score: 10,
            level_xp_step: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboConfig {
    pub perfect_gain: f64,
    pub best_gain: f64,
    /// Decay applied when latency exceeds the staleness threshold.
    pub stale_decay: f64,
    pub ceiling: f64,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            perfect_gain: 2.0,
            best_gain: 1.0,
            stale_decay: 1.0,
            ceiling: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Trailing window of the typed buffer scanned for textual triggers.
    pub window: usize,
    /// Recent keystrokes considered by the rhythm trigger.
    pub recent: usize,
    pub perfect_rhythm_min: usize,
    pub perfect_rhythm_per: u32,
    pub declaration_keywords: Vec<String>,
    pub declaration_bonus: u32,
    pub advanced_keywords: Vec<String>,
    pub advanced_bonus: u32,
    pub arrow_bonus: u32,
    pub bracket_min: usize,
    pub bracket_bonus: u32,
    pub quote_bonus: u32,
    pub combo_milestone_step: u32,
    pub combo_milestone_per: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            window: 10,
            recent: 5,
            perfect_rhythm_min: 3,
            perfect_rhythm_per: 75,
            declaration_keywords: ["function", "const", "let", "var"]
                .map(String::from)
                .to_vec(),
            declaration_bonus: 150,
            advanced_keywords: ["async", "await", "class", "impl"]
                .map(String::from)
                .to_vec(),
            advanced_bonus: 200,
            arrow_bonus: 140,
            bracket_min: 4,
            bracket_bonus: 125,
            quote_bonus: 110,
            combo_milestone_step: 10,
            combo_milestone_per: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AchievementThresholds {
    pub perfect_streak: u32,
    pub max_combo: f64,
    pub accuracy: f64,
    pub wpm: f64,
    pub total_score: u64,
}

impl Default for AchievementThresholds {
    fn default() -> Self {
        Self {
            perfect_streak: 15,
            max_combo: 50.0,
            accuracy: 100.0,
            wpm: 60.0,
            total_score: 5000,
        }
    }
}

/// Per-kind minimum dispatch intervals and queue limits for cosmetic
/// effects. Requests arriving inside an interval are dropped, not deferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    pub keystroke_glow_interval_ms: u64,
    pub combo_flame_interval_ms: u64,
    pub pattern_burst_interval_ms: u64,
    pub confetti_interval_ms: u64,
    pub celebration_interval_ms: u64,
    pub queue_cap: usize,
    /// Dispatched effects older than this are pruned from session state.
    pub max_effect_age_ms: u64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            keystroke_glow_interval_ms: 50,
            combo_flame_interval_ms: 100,
            pattern_burst_interval_ms: 150,
            confetti_interval_ms: 200,
            celebration_interval_ms: 1000,
            queue_cap: 64,
            max_effect_age_ms: 3000,
        }
    }
}

/// Intervals of the three background ticks. They run uncoordinated with
/// each other and with keystroke arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickIntervals {
    pub stats_ms: u64,
    pub performance_ms: u64,
    pub effect_drain_ms: u64,
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            stats_ms: 100,
            performance_ms: 1000,
            effect_drain_ms: 100,
        }
    }
}

/// Construction-time engine configuration. Every tunable has a default;
/// hosts typically override a handful of fields or deserialize the whole
/// struct from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub speed: SpeedThresholds,
    pub scoring: ScoringConfig,
    pub combo: ComboConfig,
    pub patterns: PatternConfig,
    pub achievements: AchievementThresholds,
    pub effects: EffectSettings,
    pub ticks: TickIntervals,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let loaded = EngineConfig::from_json(&json).unwrap();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg = EngineConfig::from_json(
            r#"{"combo": {"perfect_gain": 3.0, "best_gain": 1.0, "stale_decay": 1.0, "ceiling": 50.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.combo.perfect_gain, 3.0);
        assert_eq!(cfg.combo.ceiling, 50.0);
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn tier_table_lookup() {
        let table = ScoringConfig::default().speed_bonus;
        assert_eq!(table.get(SpeedTier::Perfect), 100);
        assert_eq!(table.get(SpeedTier::Lame), 0);
    }

    #[test]
    fn default_multipliers_match_tiers() {
        let m = ScoringConfig::default().speed_multiplier;
        assert_eq!(m.get(SpeedTier::Perfect), 2.0);
        assert_eq!(m.get(SpeedTier::Best), 1.5);
        assert_eq!(m.get(SpeedTier::Good), 1.2);
        assert_eq!(m.get(SpeedTier::Lame), 1.0);
    }
}
