use crate::achievements::AchievementId;
use crate::patterns::PatternMatch;
use crate::speed::SpeedTier;
use crate::stats::SessionSummary;

/// Typed domain events emitted by the engine. Payloads are owned snapshots;
/// subscribers can keep them without touching live session state.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// First keystroke of a session started the clock.
    Start,
    CharacterProcessed {
        ch: char,
        is_correct: bool,
        tier: SpeedTier,
        index: usize,
    },
    CorrectChar {
        ch: char,
        tier: SpeedTier,
        combo: f64,
        patterns: Vec<PatternMatch>,
        score: u32,
        total_score: u64,
    },
    IncorrectChar {
        ch: char,
        total_score: u64,
    },
    LevelUp {
        old_level: u32,
        new_level: u32,
    },
    Achievement {
        id: AchievementId,
    },
    Complete {
        summary: SessionSummary,
    },
}

/// Compile-time-checked event subscription; no string-keyed dispatch.
pub trait EventSink {
    fn on_event(&mut self, event: &EngineEvent);
}

impl<F: FnMut(&EngineEvent)> EventSink for F {
    fn on_event(&mut self, event: &EngineEvent) {
        self(event)
    }
}

/// Collects events into a vector; handy for tests and polling consumers.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<EngineEvent>,
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }
}
