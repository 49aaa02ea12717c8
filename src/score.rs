use crate::config::ScoringConfig;
use crate::speed::SpeedTier;

/// Per-keystroke score components. The total is what gets added to the
/// running session score; everything else is kept for event payloads and
/// display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub speed_bonus: u32,
    pub combo_bonus: u32,
    pub streak_bonus: u32,
    pub pattern_bonus: u32,
    pub multiplier: f64,
    pub total: u32,
}

/// A level advance produced by applying XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelAdvance {
    pub old_level: u32,
    pub new_level: u32,
}

#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    cfg: ScoringConfig,
}

impl ScoreCalculator {
    pub fn new(cfg: ScoringConfig) -> Self {
        Self { cfg }
    }

    /// Score for one correct keystroke. Incorrect keystrokes never reach
    /// this; they contribute zero by policy (no deductions in this engine).
    pub fn keystroke_score(
        &self,
        tier: SpeedTier,
        combo: f64,
        streak: u32,
        pattern_bonus: u32,
    ) -> ScoreBreakdown {
        let base = self.cfg.base;
        let speed_bonus = self.cfg.speed_bonus.get(tier);
        let combo_bonus = (combo * 3.0) as u32;
        let streak_bonus = if streak > 10 { (streak / 5) * 10 } else { 0 };
        let multiplier = self.cfg.speed_multiplier.get(tier);

        let subtotal = base + speed_bonus + combo_bonus + streak_bonus + pattern_bonus;
        let total = (subtotal as f64 * multiplier).round() as u32;

        ScoreBreakdown {
            base,
            speed_bonus,
            combo_bonus,
            streak_bonus,
            pattern_bonus,
            multiplier,
            total,
        }
    }

    pub fn xp_gain(&self, score: u32) -> u64 {
        (score / self.cfg.xp_per_score) as u64
    }

    /// XP needed to advance past `level`.
    pub fn xp_requirement(&self, level: u32) -> u64 {
        level as u64 * self.cfg.level_xp_step
    }

    /// Add XP to the running total, advancing at most one level per call
    /// and carrying the remainder. Requirements grow with the level, so a
    /// single keystroke crossing two thresholds does not occur in practice.
    pub fn apply_xp(&self, level: &mut u32, xp: &mut u64, gained: u64) -> Option<LevelAdvance> {
        *xp += gained;
        let requirement = self.xp_requirement(*level);
        if *xp >= requirement {
            let old_level = *level;
            *xp -= requirement;
            *level += 1;
            Some(LevelAdvance {
                old_level,
                new_level: *level,
            })
        } else {
            None
        }
    }
}
