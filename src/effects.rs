use crate::config::EffectSettings;
use crate::performance::PerformanceMode;
use log::{debug, trace};
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Cosmetic effect families. Purely visual; none of these feed back into
/// scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    KeystrokeGlow,
    ComboFlame,
    PatternBurst,
    Confetti,
    Celebration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectPriority {
    Low,
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectComplexity {
    Low,
    Medium,
    High,
}

/// A request to render an effect. Owned by the throttler queue until
/// dispatched or dropped; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectRequest {
    pub kind: EffectKind,
    pub priority: EffectPriority,
    pub complexity: EffectComplexity,
    pub intensity: f64,
    pub created_at: Instant,
}

/// A dispatched effect, scaled for current performance. Lives in session
/// state until pruned by age.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub intensity: f64,
    pub duration_ms: u64,
    pub particle_count: u32,
    pub started_at: Instant,
}

/// Rate-limits and prioritizes effect requests. Per-kind minimum interval
/// throttling happens at submission; a request arriving before the interval
/// elapses is dropped, not deferred. Accepted requests wait in a FIFO queue
/// for the periodic drain.
#[derive(Debug)]
pub struct EffectThrottler {
    settings: EffectSettings,
    queue: VecDeque<EffectRequest>,
    last_accepted: HashMap<EffectKind, Instant>,
}

impl EffectThrottler {
    pub fn new(settings: EffectSettings) -> Self {
        Self {
            settings,
            queue: VecDeque::new(),
            last_accepted: HashMap::new(),
        }
    }

    fn min_interval(&self, kind: EffectKind) -> Duration {
        let ms = match kind {
            EffectKind::KeystrokeGlow => self.settings.keystroke_glow_interval_ms,
            EffectKind::ComboFlame => self.settings.combo_flame_interval_ms,
            EffectKind::PatternBurst => self.settings.pattern_burst_interval_ms,
            EffectKind::Confetti => self.settings.confetti_interval_ms,
            EffectKind::Celebration => self.settings.celebration_interval_ms,
        };
        Duration::from_millis(ms)
    }

    fn base_duration_ms(kind: EffectKind) -> u64 {
        match kind {
            EffectKind::KeystrokeGlow => 300,
            EffectKind::ComboFlame => 600,
            EffectKind::PatternBurst => 800,
            EffectKind::Confetti => 1500,
            EffectKind::Celebration => 3000,
        }
    }

    fn base_particles(kind: EffectKind) -> u32 {
        match kind {
            EffectKind::KeystrokeGlow => 4,
            EffectKind::ComboFlame => 12,
            EffectKind::PatternBurst => 20,
            EffectKind::Confetti => 40,
            EffectKind::Celebration => 60,
        }
    }

    /// Returns false when the request was dropped by throttling or queue
    /// pressure.
    pub fn submit(&mut self, request: EffectRequest) -> bool {
        if let Some(last) = self.last_accepted.get(&request.kind) {
            if request.created_at.duration_since(*last) < self.min_interval(request.kind) {
                trace!("throttled {} request", request.kind);
                return false;
            }
        }

        if self.queue.len() >= self.settings.queue_cap {
            // Full queue: only Critical pushes through, displacing the
            // oldest non-critical entry.
            if request.priority < EffectPriority::Critical {
                debug!("effect queue full, dropping {} request", request.kind);
                return false;
            }
            if let Some(pos) = self
                .queue
                .iter()
                .position(|r| r.priority < EffectPriority::Critical)
            {
                self.queue.remove(pos);
            } else {
                self.queue.pop_front();
            }
        }

        self.last_accepted.insert(request.kind, request.created_at);
        self.queue.push_back(request);
        true
    }

    /// Pop a bounded batch from the queue, scaled by the current
    /// performance mode. Under Low/Minimal the queue is first trimmed to
    /// Critical-priority items; High-complexity requests are dropped
    /// outright in any reduced mode.
    pub fn drain(&mut self, now: Instant, mode: PerformanceMode) -> Vec<ActiveEffect> {
        if matches!(mode, PerformanceMode::Low | PerformanceMode::Minimal) {
            let before = self.queue.len();
            self.queue
                .retain(|r| r.priority == EffectPriority::Critical);
            if self.queue.len() < before {
                debug!(
                    "trimmed {} queued effects under {} mode",
                    before - self.queue.len(),
                    mode
                );
            }
        }

        let scale = mode.effect_scale();
        let mut rng = rand::thread_rng();
        let mut dispatched = Vec::new();

        while dispatched.len() < mode.drain_batch() {
            let Some(request) = self.queue.pop_front() else {
                break;
            };
            if mode.is_reduced() && request.complexity == EffectComplexity::High {
                trace!("skipping high-complexity {} in {} mode", request.kind, mode);
                continue;
            }

            let jitter = rng.gen_range(0.9..1.1);
            dispatched.push(ActiveEffect {
                kind: request.kind,
                intensity: request.intensity * scale * jitter,
                duration_ms: (Self::base_duration_ms(request.kind) as f64 * scale) as u64,
                particle_count: (Self::base_particles(request.kind) as f64 * scale) as u32,
                started_at: now,
            });
        }

        dispatched
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.last_accepted.clear();
    }
}
