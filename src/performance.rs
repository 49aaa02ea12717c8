use crate::ring::RingBuffer;
use log::debug;

const FPS_WINDOW: usize = 10;

/// Source of frame-rate samples. Production hosts wrap their render loop;
/// tests script the values.
pub trait FrameTimeSource {
    /// Current frames per second, or `None` when no frame has been
    /// rendered since the last sample.
    fn current_fps(&mut self) -> Option<f64>;
}

/// Classification of measured frame rate, used only to scale cosmetic
/// effect cost. Scoring never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PerformanceMode {
    High,
    Medium,
    Low,
    Minimal,
}

impl PerformanceMode {
    pub fn effect_scale(self) -> f64 {
        match self {
            PerformanceMode::High => 1.0,
            PerformanceMode::Medium => 0.7,
            PerformanceMode::Low => 0.4,
            PerformanceMode::Minimal => 0.2,
        }
    }

    /// Upper bound on effects dispatched per drain.
    pub fn drain_batch(self) -> usize {
        match self {
            PerformanceMode::High => 8,
            PerformanceMode::Medium => 4,
            PerformanceMode::Low => 2,
            PerformanceMode::Minimal => 1,
        }
    }

    /// Modes in which expensive effects are skipped entirely.
    pub fn is_reduced(self) -> bool {
        self != PerformanceMode::High
    }
}

/// Keeps a rolling window of fps samples and classifies the average into a
/// performance mode. Defaults to `High` until enough samples disagree.
#[derive(Debug)]
pub struct PerformanceMonitor {
    window: RingBuffer<f64>,
    mode: PerformanceMode,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            window: RingBuffer::new(FPS_WINDOW),
            mode: PerformanceMode::High,
        }
    }

    /// Pull one sample from the source; called from the one-second tick.
    pub fn sample(&mut self, source: &mut dyn FrameTimeSource) {
        if let Some(fps) = source.current_fps() {
            self.record_fps(fps);
        }
    }

    pub fn record_fps(&mut self, fps: f64) {
        self.window.push(fps);
        let avg = self.window.iter().sum::<f64>() / self.window.len() as f64;
        let mode = Self::classify(avg);
        if mode != self.mode {
            debug!("performance mode {} -> {} (avg {:.1} fps)", self.mode, mode, avg);
            self.mode = mode;
        }
    }

    fn classify(fps: f64) -> PerformanceMode {
        if fps >= 55.0 {
            PerformanceMode::High
        } else if fps >= 45.0 {
            PerformanceMode::Medium
        } else if fps >= 30.0 {
            PerformanceMode::Low
        } else {
            PerformanceMode::Minimal
        }
    }

    pub fn mode(&self) -> PerformanceMode {
        self.mode
    }

    pub fn effect_scale(&self) -> f64 {
        self.mode.effect_scale()
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.mode = PerformanceMode::High;
    }
}
