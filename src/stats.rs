use crate::achievements::AchievementId;
use crate::session::SessionState;
use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// One WPM sample captured by the periodic refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

/// Final aggregated stats handed to the achievement evaluator and the
/// `Complete` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub wpm: f64,
    pub accuracy: f64,
    pub total_score: u64,
    pub max_combo: f64,
    pub perfect_streak: u32,
    pub streak: u32,
    pub level: u32,
    pub errors: u32,
    pub typed_len: usize,
    pub elapsed_secs: f64,
    pub finished_at: DateTime<Local>,
    pub achievements: Vec<AchievementId>,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wpm, {}% accuracy, score {}, max combo {:.0}, level {} [{}]",
            self.wpm,
            self.accuracy,
            self.total_score,
            self.max_combo,
            self.level,
            self.achievements.iter().map(|a| a.to_string()).join(", "),
        )
    }
}

/// Recomputes derived WPM/accuracy from session state on its own cadence.
/// The values it writes back are eventually-consistent display values;
/// scoring never reads them.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    series: Vec<TimeSeriesPoint>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh `wpm`/`accuracy` on the state. A no-op before the first
    /// keystroke; after completion the clock is frozen at `ended_at`.
    pub fn refresh(&mut self, state: &mut SessionState, now: Instant) {
        let Some(started_at) = state.started_at else {
            return;
        };
        let end = state.ended_at.unwrap_or(now);
        let elapsed_secs = end.duration_since(started_at).as_secs_f64();

        let (wpm, accuracy) = Self::compute(state, elapsed_secs);
        state.set_wpm(wpm);
        state.set_accuracy(accuracy);
        self.series.push(TimeSeriesPoint {
            t: elapsed_secs,
            wpm,
        });
    }

    fn compute(state: &SessionState, elapsed_secs: f64) -> (f64, f64) {
        let typed = state.typed_len() as f64;
        let minutes = (elapsed_secs / 60.0).max(1.0 / 60_000.0);
        let wpm = ((typed / 5.0) / minutes).round();
        let accuracy =
            ((typed - state.error_count as f64) / typed.max(1.0) * 100.0).round();
        (wpm, accuracy.max(0.0))
    }

    /// Instantaneous final stats; used at completion so achievements never
    /// see a stale tick value.
    pub fn summarize(&self, state: &SessionState, now: Instant) -> SessionSummary {
        let elapsed_secs = match state.started_at {
            Some(started_at) => state
                .ended_at
                .unwrap_or(now)
                .duration_since(started_at)
                .as_secs_f64(),
            None => 0.0,
        };
        let (wpm, accuracy) = Self::compute(state, elapsed_secs);
        SessionSummary {
            wpm,
            accuracy,
            total_score: state.total_score,
            max_combo: state.max_combo,
            perfect_streak: state.perfect_streak,
            streak: state.streak,
            level: state.level,
            errors: state.error_count,
            typed_len: state.typed_len(),
            elapsed_secs,
            finished_at: Local::now(),
            achievements: state.achievements().to_vec(),
        }
    }

    pub fn series(&self) -> &[TimeSeriesPoint] {
        &self.series
    }

    pub fn reset(&mut self) {
        self.series.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn typed_state(typed: &str, errors: u32) -> SessionState {
        let mut state = SessionState::new("some target text", 100.0);
        for c in typed.chars() {
            state.append_typed_char(c);
        }
        for _ in 0..errors {
            state.increment_errors();
        }
        state
    }

    #[test]
    fn refresh_before_start_is_a_noop() {
        let mut agg = StatsAggregator::new();
        let mut state = typed_state("", 0);
        agg.refresh(&mut state, Instant::now());
        assert_eq!(state.wpm, 0.0);
        assert!(agg.series().is_empty());
    }

    #[test]
    fn wpm_uses_five_chars_per_word() {
        let mut agg = StatsAggregator::new();
        let mut state = typed_state("hello world", 0); // 11 chars
        let start = Instant::now();
        state.mark_started(start);
        // 11 chars in 6 seconds = 2.2 words / 0.1 min = 22 wpm
        agg.refresh(&mut state, start + Duration::from_secs(6));
        assert_eq!(state.wpm, 22.0);
        assert_eq!(state.accuracy, 100.0);
        assert_eq!(agg.series().len(), 1);
    }

    #[test]
    fn accuracy_counts_errors_against_typed_length() {
        let mut agg = StatsAggregator::new();
        let mut state = typed_state("test", 1);
        let start = Instant::now();
        state.mark_started(start);
        agg.refresh(&mut state, start + Duration::from_secs(1));
        assert_eq!(state.accuracy, 75.0);
    }

    #[test]
    fn accuracy_of_empty_input_is_zero() {
        let state = typed_state("", 0);
        let (_, accuracy) = StatsAggregator::compute(&state, 1.0);
        assert_eq!(accuracy, 0.0);
    }

    #[test]
    fn clock_freezes_at_session_end() {
        let mut agg = StatsAggregator::new();
        let mut state = typed_state("abcde", 0);
        let start = Instant::now();
        state.mark_started(start);
        state.mark_ended(start + Duration::from_secs(3));
        // A refresh long after completion still reports the 3s run
        agg.refresh(&mut state, start + Duration::from_secs(300));
        // 5 chars in 3s = 1 word / 0.05 min = 20 wpm
        assert_eq!(state.wpm, 20.0);
    }

    #[test]
    fn summary_display_lists_achievements() {
        let mut state = typed_state("abcde", 0);
        state.add_achievement(AchievementId::SpeedRacer);
        let agg = StatsAggregator::new();
        let summary = agg.summarize(&state, Instant::now());
        assert!(summary.to_string().contains("speed_racer"));
    }

    #[test]
    fn summary_serializes_to_json() {
        let agg = StatsAggregator::new();
        let state = typed_state("ab", 0);
        let summary = agg.summarize(&state, Instant::now());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"total_score\""));
        let back: SessionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.typed_len, 2);
    }

    #[test]
    fn reset_clears_series() {
        let mut agg = StatsAggregator::new();
        let mut state = typed_state("abc", 0);
        let start = Instant::now();
        state.mark_started(start);
        agg.refresh(&mut state, start + Duration::from_secs(1));
        assert!(!agg.series().is_empty());
        agg.reset();
        assert!(agg.series().is_empty());
    }
}
