//! Sample sources.
//!
//! Two interchangeable producers feed the detection pipeline: a synthetic
//! random-walk generator driven on the sampling cadence, and a relay that
//! derives a full reading from an externally pushed heart-rate value. Both
//! produce plain [`Reading`]s; the session owns the shared downstream state.

use crate::config::SamplingConfig;
use crate::domain::Reading;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Baseline resting values the generator restarts from.
pub const BASELINE: (f32, f32, f32) = (80.0, 55.0, 3.5);

/// Synthetic random-walk signal generator.
///
/// While no intervention is active each channel takes an independent uniform
/// perturbation per tick; while intervening it instead steps
/// deterministically back toward baseline. Output is always soft-clamped.
/// `reset` restores the baseline triple, making the sequence restartable.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    cfg: SamplingConfig,
    rng: SmallRng,
    hr: f32,
    hrv: f32,
    eda: f32,
}

impl SyntheticSource {
    pub fn new(cfg: SamplingConfig) -> Self {
        Self::with_seed(cfg, rand::random())
    }

    /// Seeded constructor for deterministic test runs.
    pub fn with_seed(cfg: SamplingConfig, seed: u64) -> Self {
        Self {
            cfg,
            rng: SmallRng::seed_from_u64(seed),
            hr: BASELINE.0,
            hrv: BASELINE.1,
            eda: BASELINE.2,
        }
    }

    /// Produce the next reading. `intervening` selects decay-toward-baseline
    /// over random drift.
    pub fn next_reading(&mut self, ts_us: i64, intervening: bool) -> Reading {
        if intervening {
            self.hr += self.cfg.decay_hr;
            self.hrv += self.cfg.decay_hrv;
            self.eda += self.cfg.decay_eda;
        } else {
            let n = self.cfg.noise_hr_hrv;
            self.hr += self.rng.gen_range(-n..=n);
            self.hrv += self.rng.gen_range(-n..=n);
            let e = self.cfg.noise_eda;
            self.eda += self.rng.gen_range(-e..=e);
        }
        let reading = Reading::clamped(ts_us, self.hr, self.hrv, self.eda);
        // Keep the walk itself inside the valid range too, so it cannot
        // drift unboundedly while the output sits at a clamp edge.
        self.hr = reading.hr;
        self.hrv = reading.hrv;
        self.eda = reading.eda;
        reading
    }

    /// Force the walk to a specific triple (emotion presets).
    pub fn set_values(&mut self, hr: f32, hrv: f32, eda: f32) {
        self.hr = hr;
        self.hrv = hrv;
        self.eda = eda;
    }

    /// Restart from the baseline triple.
    pub fn reset(&mut self) {
        self.hr = BASELINE.0;
        self.hrv = BASELINE.1;
        self.eda = BASELINE.2;
    }

    pub fn current(&self) -> (f32, f32, f32) {
        (self.hr, self.hrv, self.eda)
    }
}

/// Derive hrv and eda from an externally pushed heart rate.
///
/// Elevated heart rates map to proportionally suppressed HRV and elevated
/// EDA; at or below 100 bpm both derived channels sit at baseline.
pub fn derive_from_hr(hr: f32) -> (f32, f32) {
    if hr > 100.0 {
        let hrv = (55.0 - (hr - 80.0) * 0.5).max(30.0);
        let eda = (3.5 + (hr - 80.0) * 0.1).min(8.0);
        (hrv, eda)
    } else {
        (55.0, 3.5)
    }
}

/// Build a full reading from a pushed heart-rate value.
pub fn reading_from_push(ts_us: i64, hr: f32) -> Reading {
    let (hrv, eda) = derive_from_hr(hr);
    Reading::clamped(ts_us, hr, hrv, eda)
}
