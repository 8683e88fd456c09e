//! HeartMelody core: real-time emotion-escalation detection and
//! calming-intervention engine.
//!
//! The pipeline is a single logical timeline: a sample source (synthetic
//! random walk or external heart-rate pushes) produces readings, each
//! reading gets a stability index, the risk classifier maps it to a tier,
//! and the episode state machine runs the countdown / intervention /
//! recovery lifecycle, emitting declarative effect requests that an outer
//! driver executes. Everything is `tick(now_us)`-driven so a test can
//! advance a virtual clock deterministically.

pub mod classifier;
pub mod config;
pub mod domain;
pub mod episode;
pub mod history;
pub mod pacer;
pub mod score;
pub mod session;
pub mod source;

#[cfg(test)]
mod tests_proptest;

// Domain types
pub use domain::{
    dt_sec, dt_us, BreathingPhase, Classification, Effect, EmotionPreset, EpisodeState, Reading,
    RiskTier, ScoredReading,
};

// Configuration
pub use config::{
    ConfigError, EngineConfig, EpisodeConfig, PacerConfig, SamplingConfig, ScoreConfig, Thresholds,
};

// Pipeline stages
pub use classifier::classify;
pub use episode::{recovery_holds, EpisodeMachine};
pub use history::History;
pub use pacer::BreathingPacer;
pub use score::stability;
pub use source::{derive_from_hr, reading_from_push, SyntheticSource};

// Orchestrator
pub use session::{Session, Snapshot};
