use crate::achievements::AchievementId;
use crate::effects::ActiveEffect;
use crate::patterns::PatternMatch;
use crate::ring::RingBuffer;
use crate::speed::SpeedTier;
use std::time::{Duration, Instant};

const SPEED_HISTORY_LEN: usize = 5;
const RECENTLY_TYPED_LEN: usize = 10;
const PATTERN_HISTORY_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Display status of a single target character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CharStatus {
    Pending,
    Current,
    Correct,
    Incorrect,
}

/// One processed keystroke as remembered by the bounded history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeystrokeRecord {
    pub ch: char,
    pub index: usize,
    pub tier: SpeedTier,
    pub timestamp: Instant,
    pub combo: f64,
}

/// Single mutable source of truth for a typing session. All writes go
/// through explicit mutators; the processor is the only writer during a
/// session, background ticks only read.
#[derive(Debug)]
pub struct SessionState {
    target: Vec<char>,
    combo_ceiling: f64,

    pub current_index: usize,
    typed: Vec<char>,
    outcomes: Vec<Option<Outcome>>,
    tiers: Vec<Option<SpeedTier>>,
    upgrades: Vec<u8>,
    pub error_count: u32,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
    pub last_keystroke_at: Option<Instant>,
    pub wpm: f64,
    pub accuracy: f64,
    pub streak: u32,
    pub combo: f64,
    pub max_combo: f64,
    pub perfect_streak: u32,
    pub total_score: u64,
    pub level: u32,
    pub xp: u64,
    pub speed_history: RingBuffer<SpeedTier>,
    pub recently_typed: RingBuffer<KeystrokeRecord>,
    pub pattern_history: RingBuffer<PatternMatch>,
    achievements: Vec<AchievementId>,
    pub active_effects: Vec<ActiveEffect>,
}

impl SessionState {
    pub fn new(target: &str, combo_ceiling: f64) -> Self {
        let target: Vec<char> = target.chars().collect();
        let len = target.len();
        Self {
            target,
            combo_ceiling,
            current_index: 0,
            typed: Vec::new(),
            outcomes: vec![None; len],
            tiers: vec![None; len],
            upgrades: vec![0; len],
            error_count: 0,
            started_at: None,
            ended_at: None,
            last_keystroke_at: None,
            wpm: 0.0,
            accuracy: 0.0,
            streak: 0,
            combo: 1.0,
            max_combo: 1.0,
            perfect_streak: 0,
            total_score: 0,
            level: 1,
            xp: 0,
            speed_history: RingBuffer::new(SPEED_HISTORY_LEN),
            recently_typed: RingBuffer::new(RECENTLY_TYPED_LEN),
            pattern_history: RingBuffer::new(PATTERN_HISTORY_LEN),
            achievements: Vec::new(),
            active_effects: Vec::new(),
        }
    }

    /// Restore every session-scoped field to its default. The target text
    /// is kept; achievements are session-scoped and cleared too (persisting
    /// them across sessions is an external collaborator's job).
    pub fn reset(&mut self) {
        let target = std::mem::take(&mut self.target);
        *self = Self::new(&target.iter().collect::<String>(), self.combo_ceiling);
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    pub fn target_char(&self, index: usize) -> Option<char> {
        self.target.get(index).copied()
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_len(&self) -> usize {
        self.typed.len()
    }

    pub fn achievements(&self) -> &[AchievementId] {
        &self.achievements
    }

    // --- mutators -------------------------------------------------------

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    /// Append-only during a session; incorrect keystrokes append the
    /// character that was actually typed.
    pub fn append_typed_char(&mut self, ch: char) {
        self.typed.push(ch);
    }

    pub fn increment_errors(&mut self) {
        self.error_count += 1;
    }

    pub fn set_streak(&mut self, streak: u32) {
        self.streak = streak;
    }

    pub fn set_perfect_streak(&mut self, streak: u32) {
        self.perfect_streak = streak;
    }

    /// Clamped to [1.0, ceiling]; combo never drops below 1.0.
    pub fn set_combo(&mut self, combo: f64) {
        self.combo = combo.clamp(1.0, self.combo_ceiling);
    }

    /// Monotonic high-water mark.
    pub fn update_max_combo(&mut self) {
        if self.combo > self.max_combo {
            self.max_combo = self.combo;
        }
    }

    /// Additive only; this engine never deducts score.
    pub fn add_score(&mut self, points: u32) {
        self.total_score += points as u64;
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn set_xp(&mut self, xp: u64) {
        self.xp = xp;
    }

    /// Idempotent; returns false when the id was already unlocked.
    pub fn add_achievement(&mut self, id: AchievementId) -> bool {
        if self.achievements.contains(&id) {
            return false;
        }
        self.achievements.push(id);
        true
    }

    pub fn record_outcome(&mut self, index: usize, outcome: Outcome) {
        if let Some(slot) = self.outcomes.get_mut(index) {
            *slot = Some(outcome);
        }
    }

    /// Remember the tier a character was typed at and raise its cosmetic
    /// upgrade level if this attempt beat the previous one.
    pub fn record_tier(&mut self, index: usize, tier: SpeedTier) {
        if let Some(slot) = self.tiers.get_mut(index) {
            *slot = Some(tier);
        }
        if let Some(slot) = self.upgrades.get_mut(index) {
            *slot = (*slot).max(tier.upgrade_level());
        }
    }

    pub fn push_speed(&mut self, tier: SpeedTier) {
        self.speed_history.push(tier);
    }

    pub fn push_recent(&mut self, record: KeystrokeRecord) {
        self.recently_typed.push(record);
    }

    pub fn push_pattern(&mut self, m: PatternMatch) {
        self.pattern_history.push(m);
    }

    pub fn push_effect(&mut self, effect: ActiveEffect) {
        self.active_effects.push(effect);
    }

    /// Drop dispatched effects older than `max_age`.
    pub fn prune_effects(&mut self, now: Instant, max_age: Duration) {
        self.active_effects
            .retain(|e| now.duration_since(e.started_at) < max_age);
    }

    pub fn set_wpm(&mut self, wpm: f64) {
        self.wpm = wpm;
    }

    pub fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = accuracy;
    }

    pub fn mark_started(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn mark_ended(&mut self, now: Instant) {
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
        }
    }

    pub fn note_keystroke(&mut self, now: Instant) {
        self.last_keystroke_at = Some(now);
    }

    // --- read-only queries ---------------------------------------------

    pub fn char_status(&self, index: usize) -> CharStatus {
        match self.outcomes.get(index) {
            Some(Some(Outcome::Correct)) => CharStatus::Correct,
            Some(Some(Outcome::Incorrect)) => CharStatus::Incorrect,
            Some(None) if index == self.current_index => CharStatus::Current,
            _ => CharStatus::Pending,
        }
    }

    pub fn char_speed(&self, index: usize) -> Option<SpeedTier> {
        self.tiers.get(index).copied().flatten()
    }

    pub fn char_upgrade(&self, index: usize) -> u8 {
        self.upgrades.get(index).copied().unwrap_or(0)
    }

    /// Completion percentage, 0..=100.
    pub fn progress(&self) -> u8 {
        if self.target.is_empty() {
            return 100;
        }
        ((self.current_index * 100) / self.target.len()).min(100) as u8
    }

    pub fn is_complete(&self) -> bool {
        !self.target.is_empty() && self.current_index >= self.target.len()
    }
}
