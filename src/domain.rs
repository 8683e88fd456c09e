use serde::{Deserialize, Serialize};

// ============================================================================
// STRICT TIME HELPERS — Prevent Wraparound
// ============================================================================

/// Compute time delta with saturating subtraction to prevent wraparound.
/// If clocks go backwards (now < last), returns 0 instead of wrapping to huge value.
#[inline]
pub fn dt_us(now_us: i64, last_us: i64) -> u64 {
    if now_us >= last_us {
        (now_us - last_us) as u64
    } else {
        // Clock went backwards - return 0 instead of wrapping
        0
    }
}

/// Compute time delta in seconds with saturating subtraction.
/// Convenience wrapper around dt_us for floating-point calculations.
#[inline]
pub fn dt_sec(now_us: i64, last_us: i64) -> f32 {
    (dt_us(now_us, last_us) as f32) / 1_000_000.0
}

// ============================================================================
// SIGNAL MODEL
// ============================================================================

/// A single physiological sample. Immutable once created.
///
/// Values are soft-clamped to the reference ranges at ingestion
/// (hr 60-140 bpm, hrv 20-80 ms, eda 1-10 uS).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Timestamp in microseconds since epoch.
    pub ts_us: i64,

    /// Heart rate in beats per minute (BPM).
    /// Proxy for autonomic arousal; rises ahead of behavioral escalation.
    pub hr: f32,

    /// Heart Rate Variability in milliseconds.
    /// Higher HRV indicates better parasympathetic tone; drops under stress.
    pub hrv: f32,

    /// Electrodermal activity in microsiemens (uS).
    /// Sympathetic skin response; rises with emotional arousal.
    pub eda: f32,
}

impl Reading {
    /// Reference range for heart rate (bpm).
    pub const HR_RANGE: (f32, f32) = (60.0, 140.0);
    /// Reference range for heart rate variability (ms).
    pub const HRV_RANGE: (f32, f32) = (20.0, 80.0);
    /// Reference range for electrodermal activity (uS).
    pub const EDA_RANGE: (f32, f32) = (1.0, 10.0);

    /// Construct a reading with all channels soft-clamped to their
    /// reference ranges.
    pub fn clamped(ts_us: i64, hr: f32, hrv: f32, eda: f32) -> Self {
        Self {
            ts_us,
            hr: hr.clamp(Self::HR_RANGE.0, Self::HR_RANGE.1),
            hrv: hrv.clamp(Self::HRV_RANGE.0, Self::HRV_RANGE.1),
            eda: eda.clamp(Self::EDA_RANGE.0, Self::EDA_RANGE.1),
        }
    }
}

/// A reading plus its derived stability index. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredReading {
    pub reading: Reading,
    /// Composite stability index in [0, 1]. 1.0 = fully calm.
    pub stability: f32,
}

// ============================================================================
// RISK CLASSIFICATION
// ============================================================================

/// Discrete escalation risk tier.
///
/// Only `High` drives the episode state machine; `Medium` is informational
/// and surfaced to the presentation layer for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Output of one classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: RiskTier,
    /// Heart-rate slope over the trend window, bpm per second.
    pub hr_trend: f32,
    /// HRV slope over the trend window, ms per second.
    pub hrv_trend: f32,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            tier: RiskTier::Low,
            hr_trend: 0.0,
            hrv_trend: 0.0,
        }
    }
}

// ============================================================================
// EPISODE LIFECYCLE
// ============================================================================

/// Lifecycle state of an escalation episode. Exactly one per session.
///
/// Transitions are owned by the episode state machine; nothing else mutates
/// this directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeState {
    /// No episode in progress.
    Idle,
    /// High risk detected; grace window before intervention starts.
    CountingDown {
        /// Whole seconds remaining until intervention.
        remaining_secs: u8,
    },
    /// Calming intervention active (breathing pacer + audio).
    Intervening,
}

/// Breathing guide phase while an intervention is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathingPhase {
    Inhale,
    Exhale,
}

impl BreathingPhase {
    /// Visual scale factor the presentation layer applies on phase entry.
    pub fn scale(self) -> f32 {
        match self {
            BreathingPhase::Inhale => 0.8,
            BreathingPhase::Exhale => 1.2,
        }
    }
}

/// Declarative side-effect request emitted by the state machine.
///
/// The machine never touches audio or animation itself; an outer driver
/// executes these. Stop requests are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    StartPacer,
    StopPacer,
    StartAudio,
    StopAudio,
}

// ============================================================================
// EMOTION PRESETS
// ============================================================================

/// Named physiological presets for manual testing and demonstration.
/// Each maps to a literal (hr, hrv, eda) triple injected through the normal
/// scoring/classification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionPreset {
    /// Settled baseline state.
    Calm,
    /// Slightly elevated arousal.
    MildStress,
    /// Clearly stressed but below alarm thresholds.
    ModerateTension,
    /// Escalating: breaches thresholds and triggers the warning window.
    Agitated,
}

impl EmotionPreset {
    /// The (hr, hrv, eda) triple this preset injects.
    pub fn values(self) -> (f32, f32, f32) {
        match self {
            EmotionPreset::Calm => (75.0, 60.0, 2.5),
            EmotionPreset::MildStress => (85.0, 50.0, 4.0),
            EmotionPreset::ModerateTension => (95.0, 40.0, 5.5),
            EmotionPreset::Agitated => (110.0, 30.0, 8.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_never_wraps() {
        assert_eq!(dt_us(2_000, 1_000), 1_000);
        assert_eq!(dt_us(1_000, 2_000), 0);
        assert_eq!(dt_sec(1_500_000, 1_000_000), 0.5);
        assert_eq!(dt_sec(0, 1_000_000), 0.0);
    }

    #[test]
    fn reading_soft_clamp() {
        let r = Reading::clamped(0, 300.0, 5.0, -2.0);
        assert_eq!(r.hr, 140.0);
        assert_eq!(r.hrv, 20.0);
        assert_eq!(r.eda, 1.0);

        let ok = Reading::clamped(0, 80.0, 55.0, 3.5);
        assert_eq!((ok.hr, ok.hrv, ok.eda), (80.0, 55.0, 3.5));
    }

    #[test]
    fn phase_scale_factors() {
        assert_eq!(BreathingPhase::Inhale.scale(), 0.8);
        assert_eq!(BreathingPhase::Exhale.scale(), 1.2);
    }

    #[test]
    fn preset_triples() {
        assert_eq!(EmotionPreset::Agitated.values(), (110.0, 30.0, 8.0));
        assert_eq!(EmotionPreset::Calm.values(), (75.0, 60.0, 2.5));
    }
}
