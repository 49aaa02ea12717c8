use crate::achievements::AchievementEvaluator;
use crate::config::EngineConfig;
use crate::engine::EngineError;
use crate::events::EngineEvent;
use crate::patterns::PatternDetector;
use crate::score::ScoreCalculator;
use crate::session::{KeystrokeRecord, Outcome, SessionState};
use crate::speed::{self, SpeedTier};
use crate::stats::StatsAggregator;
use log::debug;
use std::time::Instant;

/// Session lifecycle. `Complete` is terminal; only an external `reset()`
/// returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Complete,
}

/// Orchestrates the per-keystroke pipeline: latency classification, combo
/// and streak bookkeeping, pattern detection, scoring, and session
/// completion. Synchronous with no suspension point; the next keystroke
/// waits for the previous pipeline to finish.
#[derive(Debug)]
pub struct KeystrokeProcessor {
    cfg: EngineConfig,
    calculator: ScoreCalculator,
    detector: PatternDetector,
    evaluator: AchievementEvaluator,
    phase: Phase,
}

impl KeystrokeProcessor {
    pub fn new(cfg: EngineConfig) -> Self {
        let calculator = ScoreCalculator::new(cfg.scoring.clone());
        let detector = PatternDetector::new(cfg.patterns.clone());
        let evaluator = AchievementEvaluator::new(cfg.achievements);
        Self {
            cfg,
            calculator,
            detector,
            evaluator,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the pipeline for one decoded keystroke. Emits events into
    /// `out`; after completion further keystrokes are ignored.
    pub fn process(
        &mut self,
        state: &mut SessionState,
        aggregator: &StatsAggregator,
        ch: char,
        now: Instant,
        out: &mut Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        if state.target_len() == 0 {
            return Err(EngineError::NoTarget);
        }
        if self.phase == Phase::Complete {
            return Ok(());
        }
        if self.phase == Phase::Idle {
            self.phase = Phase::Active;
            state.mark_started(now);
            debug!("session started");
            out.push(EngineEvent::Start);
        }

        // The first keystroke has no prior timestamp; classify it with the
        // configured neutral latency instead.
        let latency_ms = match state.last_keystroke_at {
            Some(prev) => now.duration_since(prev).as_millis() as u64,
            None => self.cfg.speed.neutral_first_ms,
        };
        state.note_keystroke(now);

        let index = state.current_index;
        let expected = state
            .target_char(index)
            .ok_or(EngineError::NoTarget)?;

        if ch == expected {
            self.process_correct(state, ch, index, latency_ms, now, out);
        } else {
            self.process_incorrect(state, ch, index, now, out);
        }

        if state.is_complete() {
            self.finalize(state, aggregator, now, out);
        }
        Ok(())
    }

    fn process_correct(
        &mut self,
        state: &mut SessionState,
        ch: char,
        index: usize,
        latency_ms: u64,
        now: Instant,
        out: &mut Vec<EngineEvent>,
    ) {
        let tier = speed::classify(latency_ms, &self.cfg.speed);

        state.set_streak(state.streak + 1);
        state.set_perfect_streak(if tier == SpeedTier::Perfect {
            state.perfect_streak + 1
        } else {
            0
        });

        // Stale keystrokes decay the combo regardless of tier; otherwise
        // the tier decides the gain.
        let combo = state.combo;
        if latency_ms > self.cfg.speed.stale_ms {
            state.set_combo(combo - self.cfg.combo.stale_decay);
        } else {
            let gain = match tier {
                SpeedTier::Perfect => self.cfg.combo.perfect_gain,
                SpeedTier::Best => self.cfg.combo.best_gain,
                _ => 0.0,
            };
            state.set_combo(combo + gain);
        }
        state.update_max_combo();

        state.append_typed_char(ch);
        state.record_outcome(index, Outcome::Correct);
        state.record_tier(index, tier);
        state.push_speed(tier);
        state.push_recent(KeystrokeRecord {
            ch,
            index,
            tier,
            timestamp: now,
            combo: state.combo,
        });

        let recent_tiers: Vec<SpeedTier> = state.speed_history.iter().copied().collect();
        let matches = self
            .detector
            .detect(state.typed(), &recent_tiers, state.combo, now);
        let pattern_bonus: u32 = matches.iter().map(|m| m.bonus).sum();
        for m in &matches {
            state.push_pattern(*m);
        }

        let breakdown =
            self.calculator
                .keystroke_score(tier, state.combo, state.streak, pattern_bonus);
        state.add_score(breakdown.total);

        let gained = self.calculator.xp_gain(breakdown.total);
        let mut level = state.level;
        let mut xp = state.xp;
        let advance = self.calculator.apply_xp(&mut level, &mut xp, gained);
        state.set_level(level);
        state.set_xp(xp);

        state.set_current_index(index + 1);

        out.push(EngineEvent::CharacterProcessed {
            ch,
            is_correct: true,
            tier,
            index,
        });
        out.push(EngineEvent::CorrectChar {
            ch,
            tier,
            combo: state.combo,
            patterns: matches,
            score: breakdown.total,
            total_score: state.total_score,
        });
        if let Some(advance) = advance {
            debug!("level up: {} -> {}", advance.old_level, advance.new_level);
            out.push(EngineEvent::LevelUp {
                old_level: advance.old_level,
                new_level: advance.new_level,
            });
        }
    }

    /// Incorrect keystrokes reset streaks and combo, count an error, and
    /// leave the cursor in place for a retry. They add zero score; this
    /// engine never deducts points.
    fn process_incorrect(
        &mut self,
        state: &mut SessionState,
        ch: char,
        index: usize,
        now: Instant,
        out: &mut Vec<EngineEvent>,
    ) {
        let tier = SpeedTier::Lame;

        state.increment_errors();
        state.set_streak(0);
        state.set_perfect_streak(0);
        state.set_combo(1.0);

        state.append_typed_char(ch);
        state.record_outcome(index, Outcome::Incorrect);
        state.push_speed(tier);
        state.push_recent(KeystrokeRecord {
            ch,
            index,
            tier,
            timestamp: now,
            combo: state.combo,
        });

        out.push(EngineEvent::CharacterProcessed {
            ch,
            is_correct: false,
            tier,
            index,
        });
        out.push(EngineEvent::IncorrectChar {
            ch,
            total_score: state.total_score,
        });
    }

    /// Finalize the session: freeze the clock, write final stats, run the
    /// achievement pass, and emit `Complete`. Idempotent; redundant calls
    /// do not re-mutate finalized fields.
    pub fn finalize(
        &mut self,
        state: &mut SessionState,
        aggregator: &StatsAggregator,
        now: Instant,
        out: &mut Vec<EngineEvent>,
    ) {
        if self.phase != Phase::Active {
            return;
        }
        self.phase = Phase::Complete;
        state.mark_ended(now);

        let stats = aggregator.summarize(state, now);
        state.set_wpm(stats.wpm);
        state.set_accuracy(stats.accuracy);

        for id in self.evaluator.evaluate(&stats, state.achievements()) {
            if state.add_achievement(id) {
                debug!("achievement unlocked: {id}");
                out.push(EngineEvent::Achievement { id });
            }
        }

        let mut summary = stats;
        summary.achievements = state.achievements().to_vec();
        debug!("session complete: {summary}");
        out.push(EngineEvent::Complete { summary });
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}
