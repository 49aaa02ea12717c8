// Real-time typing-performance scoring and gamification engine.
// Headless by design: hosts feed decoded keystrokes in, subscribe to typed
// domain events, and render the cosmetic effect requests however they like.
pub mod achievements;
pub mod config;
pub mod effects;
pub mod engine;
pub mod events;
pub mod patterns;
pub mod performance;
pub mod processor;
pub mod ring;
pub mod score;
pub mod session;
pub mod speed;
pub mod stats;

mod runtime;

pub use achievements::AchievementId;
pub use config::EngineConfig;
pub use engine::{Engine, EngineError};
pub use events::{EngineEvent, EventSink};
pub use patterns::PatternKind;
pub use performance::{FrameTimeSource, PerformanceMode};
pub use session::CharStatus;
pub use speed::SpeedTier;
pub use stats::SessionSummary;
