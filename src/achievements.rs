use crate::config::AchievementThresholds;
use crate::stats::SessionSummary;
use serde::{Deserialize, Serialize};

/// Unlockable achievement identifiers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    SpeedDemon,
    ComboMaster,
    Perfectionist,
    SpeedRacer,
    HighScorer,
}

/// Evaluates unlock thresholds against final session stats. Runs once at
/// completion; each check is independent and skips already-unlocked ids, so
/// re-running after a redundant `complete()` produces nothing new.
#[derive(Debug, Clone)]
pub struct AchievementEvaluator {
    cfg: AchievementThresholds,
}

impl AchievementEvaluator {
    pub fn new(cfg: AchievementThresholds) -> Self {
        Self { cfg }
    }

    pub fn evaluate(
        &self,
        stats: &SessionSummary,
        unlocked: &[AchievementId],
    ) -> Vec<AchievementId> {
        let mut earned = Vec::new();
        let mut check = |id: AchievementId, hit: bool| {
            if hit && !unlocked.contains(&id) {
                earned.push(id);
            }
        };

        check(
            AchievementId::SpeedDemon,
            stats.perfect_streak >= self.cfg.perfect_streak,
        );
        check(AchievementId::ComboMaster, stats.max_combo >= self.cfg.max_combo);
        check(
            AchievementId::Perfectionist,
            stats.accuracy >= self.cfg.accuracy,
        );
        check(AchievementId::SpeedRacer, stats.wpm >= self.cfg.wpm);
        check(
            AchievementId::HighScorer,
            stats.total_score >= self.cfg.total_score,
        );

        earned
    }
}
