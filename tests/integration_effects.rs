// Effect throttling and performance scaling driven through the Engine with
// a scripted frame-rate source and an explicit clock.

use keyrush::effects::{
    EffectComplexity, EffectKind, EffectPriority, EffectRequest, EffectThrottler,
};
use keyrush::engine::Engine;
use keyrush::performance::{FrameTimeSource, PerformanceMode};
use keyrush::EngineConfig;
use std::time::{Duration, Instant};

struct ConstantFps(f64);

impl FrameTimeSource for ConstantFps {
    fn current_fps(&mut self) -> Option<f64> {
        Some(self.0)
    }
}

#[test]
fn confetti_burst_is_throttled_to_one_dispatch() {
    let mut throttler = EffectThrottler::new(EngineConfig::default().effects);
    let start = Instant::now();

    for i in 0..10 {
        throttler.submit(EffectRequest {
            kind: EffectKind::Confetti,
            priority: EffectPriority::Normal,
            complexity: EffectComplexity::Medium,
            intensity: 1.0,
            created_at: start + Duration::from_millis(i * 10),
        });
    }

    let dispatched = throttler.drain(start + Duration::from_millis(100), PerformanceMode::High);
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].kind, EffectKind::Confetti);
}

#[test]
fn typing_produces_active_effects_via_drain_tick() {
    let mut engine = Engine::new();
    engine.initialize("abc").unwrap();
    let start = Instant::now();

    engine.process_key_press_at('a', start).unwrap();
    assert!(engine.queued_effects() > 0);
    assert!(engine.active_effects().is_empty());

    engine.tick_at(start + Duration::from_millis(110));
    assert!(!engine.active_effects().is_empty());
    assert_eq!(engine.queued_effects(), 0);
}

#[test]
fn old_effects_are_pruned_by_age() {
    let mut engine = Engine::new();
    engine.initialize("abc").unwrap();
    let start = Instant::now();

    engine.process_key_press_at('a', start).unwrap();
    engine.tick_at(start + Duration::from_millis(110));
    assert!(!engine.active_effects().is_empty());

    // Default max age is 3s; a much later drain tick prunes everything
    engine.tick_at(start + Duration::from_secs(10));
    assert!(engine.active_effects().is_empty());
}

#[test]
fn low_frame_rate_degrades_performance_mode() {
    let mut engine = Engine::new();
    engine.initialize("abcdef").unwrap();
    engine.set_frame_source(ConstantFps(20.0));
    let start = Instant::now();

    engine.process_key_press_at('a', start).unwrap();
    assert_eq!(engine.performance_mode(), PerformanceMode::High);

    // Several one-second samples of 20 fps drag the rolling average down
    for i in 1..=3 {
        engine.tick_at(start + Duration::from_secs(i));
    }
    assert_eq!(engine.performance_mode(), PerformanceMode::Minimal);
}

#[test]
fn minimal_mode_trims_queue_to_critical_effects() {
    let mut engine = Engine::new();
    engine.initialize("hello").unwrap();
    engine.set_frame_source(ConstantFps(10.0));
    let start = Instant::now();

    // Degrade to Minimal before queueing anything interesting
    engine.process_key_press_at('h', start).unwrap();
    engine.tick_at(start + Duration::from_secs(1));
    assert_eq!(engine.performance_mode(), PerformanceMode::Minimal);

    // A normal keystroke glow queues...
    engine
        .process_key_press_at('e', start + Duration::from_millis(1100))
        .unwrap();
    assert!(engine.queued_effects() > 0);

    // ...but the next drain under Minimal throws non-critical work away
    engine.tick_at(start + Duration::from_millis(1200));
    assert!(engine.active_effects().is_empty());
}

#[test]
fn completion_celebration_survives_minimal_mode() {
    let mut engine = Engine::new();
    engine.initialize("hi").unwrap();
    engine.set_frame_source(ConstantFps(10.0));
    let start = Instant::now();

    engine.process_key_press_at('h', start).unwrap();
    engine.tick_at(start + Duration::from_secs(1));
    assert_eq!(engine.performance_mode(), PerformanceMode::Minimal);

    // Completing the session queues a Critical celebration, which is
    // high-complexity; Minimal mode trims the rest of the queue but keeps
    // the critical entry queued. The high-complexity skip applies when it
    // is popped, so nothing renders; the queue still drains.
    engine
        .process_key_press_at('i', start + Duration::from_millis(1100))
        .unwrap();
    let queued = engine.queued_effects();
    assert!(queued > 0);

    engine.tick_at(start + Duration::from_millis(1200));
    assert_eq!(engine.queued_effects(), 0);
}

#[test]
fn dispatched_effects_scale_down_under_medium_mode() {
    let mut engine = Engine::new();
    engine.initialize("abcd").unwrap();
    engine.set_frame_source(ConstantFps(50.0));
    let start = Instant::now();

    engine.process_key_press_at('a', start).unwrap();
    engine.tick_at(start + Duration::from_secs(1));
    assert_eq!(engine.performance_mode(), PerformanceMode::Medium);

    engine
        .process_key_press_at('b', start + Duration::from_millis(1100))
        .unwrap();
    engine.tick_at(start + Duration::from_millis(1200));

    for effect in engine.active_effects() {
        // KeystrokeGlow base particle count is 4; Medium scales by 0.7
        if effect.kind == EffectKind::KeystrokeGlow {
            assert_eq!(effect.particle_count, 2);
            assert_eq!(effect.duration_ms, 210);
        }
    }
}
