use crate::config::PatternConfig;
use crate::speed::SpeedTier;
use std::time::Instant;

/// Bonus-triggering condition detected in recently typed text or combo
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PatternKind {
    PerfectRhythm,
    FunctionDeclaration,
    AdvancedSyntax,
    ArrowFunction,
    BracketCluster,
    QuoteMaster,
    ComboMilestone,
}

/// Ephemeral match record. The bonus is applied to the score exactly once,
/// at detection time; the record itself only feeds event payloads and the
/// bounded display history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternMatch {
    pub kind: PatternKind,
    pub bonus: u32,
    pub detected_at: Instant,
}

const BRACKETS: [char; 6] = ['(', ')', '[', ']', '{', '}'];
const QUOTES: [char; 3] = ['\'', '"', '`'];

/// Stateless detector run after every correct keystroke. Triggers are
/// independent and may fire together; a trigger keeps firing on subsequent
/// keystrokes while its substring remains inside the trailing window.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    cfg: PatternConfig,
}

impl PatternDetector {
    pub fn new(cfg: PatternConfig) -> Self {
        Self { cfg }
    }

    /// Scan the trailing `window` chars of the typed buffer plus the most
    /// recent keystroke tiers and the current combo value.
    pub fn detect(
        &self,
        typed: &[char],
        recent_tiers: &[SpeedTier],
        combo: f64,
        now: Instant,
    ) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        let window: String = typed
            .iter()
            .skip(typed.len().saturating_sub(self.cfg.window))
            .collect();

        let perfect_count = recent_tiers
            .iter()
            .rev()
            .take(self.cfg.recent)
            .filter(|t| **t == SpeedTier::Perfect)
            .count();
        if perfect_count >= self.cfg.perfect_rhythm_min {
            matches.push(PatternMatch {
                kind: PatternKind::PerfectRhythm,
                bonus: perfect_count as u32 * self.cfg.perfect_rhythm_per,
                detected_at: now,
            });
        }

        if self
            .cfg
            .declaration_keywords
            .iter()
            .any(|kw| window.contains(kw.as_str()))
        {
            matches.push(PatternMatch {
                kind: PatternKind::FunctionDeclaration,
                bonus: self.cfg.declaration_bonus,
                detected_at: now,
            });
        }

        if self
            .cfg
            .advanced_keywords
            .iter()
            .any(|kw| window.contains(kw.as_str()))
        {
            matches.push(PatternMatch {
                kind: PatternKind::AdvancedSyntax,
                bonus: self.cfg.advanced_bonus,
                detected_at: now,
            });
        }

        if window.contains("=>") || window.contains("->") {
            matches.push(PatternMatch {
                kind: PatternKind::ArrowFunction,
                bonus: self.cfg.arrow_bonus,
                detected_at: now,
            });
        }

        let bracket_count = window.chars().filter(|c| BRACKETS.contains(c)).count();
        if bracket_count >= self.cfg.bracket_min {
            matches.push(PatternMatch {
                kind: PatternKind::BracketCluster,
                bonus: self.cfg.bracket_bonus,
                detected_at: now,
            });
        }

        if window.chars().any(|c| QUOTES.contains(&c)) {
            matches.push(PatternMatch {
                kind: PatternKind::QuoteMaster,
                bonus: self.cfg.quote_bonus,
                detected_at: now,
            });
        }

        // Combo milestones only fire on whole multiples of the step; combo
        // is a float, so compare against its rounded value.
        let step = self.cfg.combo_milestone_step;
        let rounded = combo.round();
        if combo > 0.0 && (combo - rounded).abs() < f64::EPSILON {
            let whole = rounded as u32;
            if whole > 0 && whole % step == 0 {
                matches.push(PatternMatch {
                    kind: PatternKind::ComboMilestone,
                    bonus: whole * self.cfg.combo_milestone_per,
                    detected_at: now,
                });
            }
        }

        matches
    }
}
