use crate::config::EngineConfig;
use crate::effects::{
    ActiveEffect, EffectComplexity, EffectKind, EffectPriority, EffectRequest, EffectThrottler,
};
use crate::events::{EngineEvent, EventSink};
use crate::performance::{FrameTimeSource, PerformanceMode, PerformanceMonitor};
use crate::processor::{KeystrokeProcessor, Phase};
use crate::runtime::{TickKind, TickScheduler};
use crate::session::{CharStatus, SessionState};
use crate::speed::SpeedTier;
use crate::stats::StatsAggregator;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `process_key_press` before `initialize`; caller misuse.
    #[error("no target text configured")]
    NoTarget,
    #[error("target text is empty")]
    EmptyTarget,
}

/// Façade wiring the engine together: owns the session state, the
/// keystroke processor, the stats aggregator, the performance monitor, the
/// effect throttler, and the tick scheduler. Single-threaded by design;
/// all mutation funnels through `&mut self` methods, so a multi-threaded
/// host wraps the whole engine in one owning task.
pub struct Engine {
    cfg: EngineConfig,
    state: SessionState,
    processor: KeystrokeProcessor,
    aggregator: StatsAggregator,
    monitor: PerformanceMonitor,
    throttler: EffectThrottler,
    scheduler: TickScheduler,
    sinks: Vec<Box<dyn EventSink>>,
    frame_source: Option<Box<dyn FrameTimeSource>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(cfg: EngineConfig) -> Self {
        Self {
            state: SessionState::new("", cfg.combo.ceiling),
            processor: KeystrokeProcessor::new(cfg.clone()),
            aggregator: StatsAggregator::new(),
            monitor: PerformanceMonitor::new(),
            throttler: EffectThrottler::new(cfg.effects),
            scheduler: TickScheduler::new(cfg.ticks),
            sinks: Vec::new(),
            frame_source: None,
            cfg,
        }
    }

    /// Configure the target text and reset all session-scoped state.
    /// Subscribers and the frame source survive re-initialization.
    pub fn initialize(&mut self, target: &str) -> Result<(), EngineError> {
        if target.is_empty() {
            return Err(EngineError::EmptyTarget);
        }
        self.state = SessionState::new(target, self.cfg.combo.ceiling);
        self.processor = KeystrokeProcessor::new(self.cfg.clone());
        self.aggregator.reset();
        self.throttler.clear();
        self.scheduler.stop();
        Ok(())
    }

    /// Register an event subscriber. Closures work directly:
    /// `engine.subscribe(|ev: &EngineEvent| ...)`.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Install the collaborator the performance sampler reads from.
    pub fn set_frame_source(&mut self, source: impl FrameTimeSource + 'static) {
        self.frame_source = Some(Box::new(source));
    }

    /// Process one decoded keystroke at the current wall clock.
    pub fn process_key_press(&mut self, ch: char) -> Result<Vec<EngineEvent>, EngineError> {
        self.process_key_press_at(ch, Instant::now())
    }

    /// Deterministic variant for hosts that own their clock.
    pub fn process_key_press_at(
        &mut self,
        ch: char,
        now: Instant,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let mut events = Vec::new();
        self.processor
            .process(&mut self.state, &self.aggregator, ch, now, &mut events)?;
        // Background timers run for the life of the session, starting with
        // the first accepted keystroke.
        self.scheduler.start(now);
        self.bridge_effects(&events, now);
        self.dispatch(&events);
        Ok(events)
    }

    /// Drive the background timers. Hosts call this from their own loop;
    /// any tick may fire between two keystrokes.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) {
        for kind in self.scheduler.due(now) {
            match kind {
                TickKind::Stats => self.aggregator.refresh(&mut self.state, now),
                TickKind::Performance => {
                    if let Some(source) = self.frame_source.as_mut() {
                        self.monitor.sample(source.as_mut());
                    }
                }
                TickKind::EffectDrain => {
                    for effect in self.throttler.drain(now, self.monitor.mode()) {
                        self.state.push_effect(effect);
                    }
                    self.state.prune_effects(
                        now,
                        Duration::from_millis(self.cfg.effects.max_effect_age_ms),
                    );
                }
            }
        }
    }

    /// Stop the session from outside, e.g. on an external deadline.
    /// No-op when idle or already complete.
    pub fn complete(&mut self) -> Vec<EngineEvent> {
        self.complete_at(Instant::now())
    }

    pub fn complete_at(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.processor
            .finalize(&mut self.state, &self.aggregator, now, &mut events);
        self.bridge_effects(&events, now);
        self.dispatch(&events);
        events
    }

    /// Cancel the timers and restore all session-scoped state. Safe to
    /// call repeatedly.
    pub fn reset(&mut self) {
        self.scheduler.stop();
        self.processor.reset();
        self.state.reset();
        self.aggregator.reset();
        self.throttler.clear();
        self.monitor.reset();
    }

    /// Turn domain events into throttled cosmetic effect requests.
    fn bridge_effects(&mut self, events: &[EngineEvent], now: Instant) {
        for event in events {
            match event {
                EngineEvent::CorrectChar { tier, patterns, .. } => {
                    let intensity = match tier {
                        SpeedTier::Perfect => 1.0,
                        SpeedTier::Best => 0.8,
                        SpeedTier::Good => 0.6,
                        SpeedTier::Lame => 0.4,
                    };
                    self.throttler.submit(EffectRequest {
                        kind: EffectKind::KeystrokeGlow,
                        priority: EffectPriority::Low,
                        complexity: EffectComplexity::Low,
                        intensity,
                        created_at: now,
                    });
                    if !patterns.is_empty() {
                        self.throttler.submit(EffectRequest {
                            kind: EffectKind::PatternBurst,
                            priority: EffectPriority::Normal,
                            complexity: EffectComplexity::Medium,
                            intensity: 1.0,
                            created_at: now,
                        });
                    }
                }
                EngineEvent::LevelUp { .. } => {
                    self.throttler.submit(EffectRequest {
                        kind: EffectKind::Confetti,
                        priority: EffectPriority::Critical,
                        complexity: EffectComplexity::Medium,
                        intensity: 1.0,
                        created_at: now,
                    });
                }
                EngineEvent::Achievement { .. } => {
                    self.throttler.submit(EffectRequest {
                        kind: EffectKind::ComboFlame,
                        priority: EffectPriority::High,
                        complexity: EffectComplexity::Medium,
                        intensity: 1.0,
                        created_at: now,
                    });
                }
                EngineEvent::Complete { .. } => {
                    self.throttler.submit(EffectRequest {
                        kind: EffectKind::Celebration,
                        priority: EffectPriority::Critical,
                        complexity: EffectComplexity::High,
                        intensity: 1.0,
                        created_at: now,
                    });
                }
                _ => {}
            }
        }
    }

    fn dispatch(&mut self, events: &[EngineEvent]) {
        for event in events {
            for sink in &mut self.sinks {
                sink.on_event(event);
            }
        }
    }

    // --- read-only queries ---------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.processor.phase()
    }

    pub fn character_status(&self, index: usize) -> CharStatus {
        self.state.char_status(index)
    }

    pub fn character_speed(&self, index: usize) -> Option<SpeedTier> {
        self.state.char_speed(index)
    }

    pub fn character_upgrade(&self, index: usize) -> u8 {
        self.state.char_upgrade(index)
    }

    pub fn progress(&self) -> u8 {
        self.state.progress()
    }

    pub fn performance_mode(&self) -> PerformanceMode {
        self.monitor.mode()
    }

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.state.active_effects
    }

    pub fn queued_effects(&self) -> usize {
        self.throttler.queue_len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
