use crate::config::TickIntervals;
use std::time::{Duration, Instant};

/// The three background cadences of the engine. They run uncoordinated
/// with each other and with keystroke arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Stats,
    Performance,
    EffectDrain,
}

/// Fixed-interval ticker driven by polled instants rather than a thread,
/// so a single-threaded host stays in control of when work runs.
#[derive(Debug, Clone, Copy)]
struct FixedTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl FixedTicker {
    fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms.max(1)),
            next_due: None,
        }
    }

    fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    fn stop(&mut self) {
        self.next_due = None;
    }

    /// True when the ticker fired. Missed intervals collapse into a single
    /// fire; ticks never queue up behind a stalled host.
    fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let mut next = due + self.interval;
                while next <= now {
                    next += self.interval;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// Tracks the stats-refresh, performance-sample, and effect-drain tickers.
/// Stopping the scheduler cancels all three, so no stale tick can touch
/// state that was reset after teardown.
#[derive(Debug)]
pub struct TickScheduler {
    stats: FixedTicker,
    performance: FixedTicker,
    drain: FixedTicker,
    running: bool,
}

impl TickScheduler {
    pub fn new(intervals: TickIntervals) -> Self {
        Self {
            stats: FixedTicker::new(intervals.stats_ms),
            performance: FixedTicker::new(intervals.performance_ms),
            drain: FixedTicker::new(intervals.effect_drain_ms),
            running: false,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.stats.start(now);
        self.performance.start(now);
        self.drain.start(now);
        self.running = true;
    }

    /// Cancel all tickers. Safe to call when already stopped.
    pub fn stop(&mut self) {
        self.stats.stop();
        self.performance.stop();
        self.drain.stop();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// All ticks due at `now`, in a fixed order.
    pub fn due(&mut self, now: Instant) -> Vec<TickKind> {
        let mut due = Vec::new();
        if self.stats.poll(now) {
            due.push(TickKind::Stats);
        }
        if self.performance.poll(now) {
            due.push(TickKind::Performance);
        }
        if self.drain.poll(now) {
            due.push(TickKind::EffectDrain);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_due_before_start() {
        let mut scheduler = TickScheduler::new(TickIntervals::default());
        assert!(scheduler.due(Instant::now()).is_empty());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn ticks_fire_at_their_own_intervals() {
        let mut scheduler = TickScheduler::new(TickIntervals::default());
        let start = Instant::now();
        scheduler.start(start);

        // 100ms: stats and drain, but not the 1s performance sample
        let due = scheduler.due(start + Duration::from_millis(100));
        assert_eq!(due, vec![TickKind::Stats, TickKind::EffectDrain]);

        // 150ms: nothing new yet
        assert!(scheduler.due(start + Duration::from_millis(150)).is_empty());

        // 1s: all three
        let due = scheduler.due(start + Duration::from_millis(1000));
        assert_eq!(
            due,
            vec![TickKind::Stats, TickKind::Performance, TickKind::EffectDrain]
        );
    }

    #[test]
    fn missed_intervals_collapse_into_one_fire() {
        let mut scheduler = TickScheduler::new(TickIntervals::default());
        let start = Instant::now();
        scheduler.start(start);

        // Host stalled for a full second; stats fires once, not ten times
        let due = scheduler.due(start + Duration::from_millis(999));
        assert_eq!(due.iter().filter(|k| **k == TickKind::Stats).count(), 1);

        // And the ticker recovers its cadence afterwards
        let due = scheduler.due(start + Duration::from_millis(1100));
        assert!(due.contains(&TickKind::Stats));
    }

    #[test]
    fn stop_cancels_all_tickers() {
        let mut scheduler = TickScheduler::new(TickIntervals::default());
        let start = Instant::now();
        scheduler.start(start);
        scheduler.stop();
        assert!(scheduler.due(start + Duration::from_secs(5)).is_empty());
        // Redundant stop is tolerated
        scheduler.stop();
    }

    #[test]
    fn restart_after_stop() {
        let mut scheduler = TickScheduler::new(TickIntervals::default());
        let start = Instant::now();
        scheduler.start(start);
        scheduler.stop();
        let later = start + Duration::from_secs(1);
        scheduler.start(later);
        assert!(scheduler
            .due(later + Duration::from_millis(100))
            .contains(&TickKind::Stats));
    }

    #[test]
    fn double_start_keeps_original_schedule() {
        let mut scheduler = TickScheduler::new(TickIntervals::default());
        let start = Instant::now();
        scheduler.start(start);
        scheduler.start(start + Duration::from_millis(90));
        assert!(scheduler
            .due(start + Duration::from_millis(100))
            .contains(&TickKind::Stats));
    }
}
