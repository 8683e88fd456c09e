use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Root engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub score: ScoreConfig,
    pub sampling: SamplingConfig,
    pub episode: EpisodeConfig,
    pub pacer: PacerConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: EngineConfig = toml::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.interval_us == 0 {
            return Err(ConfigError::Validation(
                "sampling.interval_us must be > 0".into(),
            ));
        }
        if self.pacer.half_cycle_us == 0 {
            return Err(ConfigError::Validation(
                "pacer.half_cycle_us must be > 0".into(),
            ));
        }
        if !(EpisodeConfig::WARNING_SECS_RANGE.0..=EpisodeConfig::WARNING_SECS_RANGE.1)
            .contains(&self.episode.warning_secs)
        {
            return Err(ConfigError::Validation(format!(
                "episode.warning_secs {} outside {:?}",
                self.episode.warning_secs,
                EpisodeConfig::WARNING_SECS_RANGE
            )));
        }
        let w = &self.score;
        if w.w_hr < 0.0 || w.w_hrv < 0.0 || w.w_eda < 0.0 {
            return Err(ConfigError::Validation(
                "score weights must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Alarm thresholds for the risk classifier. Mutated only by explicit user
/// configuration; read on every classification pass.
///
/// Setters clamp silently to the documented bounds rather than rejecting —
/// an out-of-range value is a degraded input, not a fatal error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Heart rate above this (bpm) contributes to High risk.
    pub hr_max: f32,
    /// HRV below this (ms) contributes to Medium risk.
    pub hrv_min: f32,
    /// EDA above this (uS) contributes to High risk.
    pub eda_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hr_max: 100.0,
            hrv_min: 35.0,
            eda_max: 6.0,
        }
    }
}

impl Thresholds {
    /// Allowed configuration range for hr_max (bpm).
    pub const HR_MAX_BOUNDS: (f32, f32) = (80.0, 120.0);
    /// Allowed configuration range for hrv_min (ms).
    pub const HRV_MIN_BOUNDS: (f32, f32) = (20.0, 50.0);
    /// Allowed configuration range for eda_max (uS).
    pub const EDA_MAX_BOUNDS: (f32, f32) = (4.0, 8.0);

    pub fn set_hr_max(&mut self, v: f32) {
        self.hr_max = v.clamp(Self::HR_MAX_BOUNDS.0, Self::HR_MAX_BOUNDS.1);
    }

    pub fn set_hrv_min(&mut self, v: f32) {
        self.hrv_min = v.clamp(Self::HRV_MIN_BOUNDS.0, Self::HRV_MIN_BOUNDS.1);
    }

    pub fn set_eda_max(&mut self, v: f32) {
        self.eda_max = v.clamp(Self::EDA_MAX_BOUNDS.0, Self::EDA_MAX_BOUNDS.1);
    }
}

/// Stability-index calculator parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Weight of the normalized heart-rate channel.
    pub w_hr: f32,
    /// Weight of the normalized (inverted) HRV channel.
    pub w_hrv: f32,
    /// Weight of the normalized EDA channel.
    pub w_eda: f32,
    /// Amplitude of the inherent-variability oscillation term.
    pub wave_amplitude: f32,
    /// Frequency of the oscillation term in Hz.
    pub wave_freq_hz: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            w_hr: 0.4,
            w_hrv: 0.3,
            w_eda: 0.3,
            wave_amplitude: 0.05,
            wave_freq_hz: 0.2,
        }
    }
}

/// Sampling cadence and synthetic-generator parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Interval between synthetic samples, microseconds.
    pub interval_us: u64,
    /// Uniform noise half-width for hr and hrv per tick.
    pub noise_hr_hrv: f32,
    /// Uniform noise half-width for eda per tick.
    pub noise_eda: f32,
    /// Per-tick decay steps toward baseline while intervening.
    pub decay_hr: f32,
    pub decay_hrv: f32,
    pub decay_eda: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_us: 200_000, // 0.2 s
            noise_hr_hrv: 1.0,
            noise_eda: 0.05,
            decay_hr: -0.5,
            decay_hrv: 0.3,
            decay_eda: -0.05,
        }
    }
}

/// Episode state machine timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// Warning-window length in seconds (grace period before intervention).
    pub warning_secs: u8,
    /// How long the recovery condition must hold before exiting intervention.
    pub recovery_confirm_us: u64,
    /// HRV must exceed this (ms) for the recovery condition.
    pub recovery_hrv_min: f32,
    /// EDA must be below this (uS) for the recovery condition.
    pub recovery_eda_max: f32,
}

impl EpisodeConfig {
    /// Allowed configuration range for the warning window.
    pub const WARNING_SECS_RANGE: (u8, u8) = (5, 10);
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            warning_secs: 5,
            recovery_confirm_us: 3_000_000, // 3 s sustained
            recovery_hrv_min: 40.0,
            recovery_eda_max: 5.0,
        }
    }
}

/// Breathing pacer timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacerConfig {
    /// Duration of each phase (half cycle), microseconds.
    pub half_cycle_us: u64,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            half_cycle_us: 4_000_000, // 4 s inhale, 4 s exhale
        }
    }
}
