//! Stability-index calculator.
//!
//! Maps a reading to a normalized [0, 1] composite score: 1.0 is fully calm,
//! 0.0 is maximal escalation risk. Pure given (reading, now) — the only time
//! dependency is the phase of the oscillation term, so tests inject a fixed
//! clock and get identical output.

use crate::config::ScoreConfig;
use crate::domain::Reading;
use std::f32::consts::PI;

/// Normalize `value` linearly against `[min, max]` into [0, 1].
#[inline]
fn z(value: f32, min: f32, max: f32) -> f32 {
    (value - min) / (max - min)
}

/// Compute the stability index for a reading at wall-clock `now_us`.
///
/// High HR and EDA pull the score down; high HRV pushes it up (the HRV
/// channel is inverted before weighting). A bounded sine term phased off the
/// wall clock models inherent physiological variability. Result is clamped
/// to [0, 1] even for out-of-range inputs.
pub fn stability(reading: &Reading, now_us: i64, cfg: &ScoreConfig) -> f32 {
    let z_hr = z(reading.hr, Reading::HR_RANGE.0, Reading::HR_RANGE.1);
    // Inverted: low HRV is bad, so z is high when hrv is low
    let z_hrv = 1.0 - z(reading.hrv, Reading::HRV_RANGE.0, Reading::HRV_RANGE.1);
    let z_eda = z(reading.eda, Reading::EDA_RANGE.0, Reading::EDA_RANGE.1);

    let base = 1.0 - cfg.w_hr * z_hr + cfg.w_hrv * z_hrv - cfg.w_eda * z_eda;

    let t_sec = now_us as f64 / 1_000_000.0;
    let wave =
        cfg.wave_amplitude * ((2.0 * PI * cfg.wave_freq_hz) as f64 * t_sec).sin() as f32;

    (base + wave).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(hr: f32, hrv: f32, eda: f32) -> Reading {
        Reading {
            ts_us: 0,
            hr,
            hrv,
            eda,
        }
    }

    #[test]
    fn score_in_unit_interval_at_extremes() {
        let cfg = ScoreConfig::default();
        // Worst case: all channels at their bad extreme
        let worst = stability(&reading(140.0, 20.0, 10.0), 0, &cfg);
        assert!((0.0..=1.0).contains(&worst));
        // Best case
        let best = stability(&reading(60.0, 80.0, 1.0), 0, &cfg);
        assert!((0.0..=1.0).contains(&best));
        assert!(best > worst);
    }

    #[test]
    fn deterministic_given_fixed_clock() {
        let cfg = ScoreConfig::default();
        let r = reading(80.0, 55.0, 3.5);
        let a = stability(&r, 1_234_567, &cfg);
        let b = stability(&r, 1_234_567, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn oscillation_bounded_by_amplitude() {
        let cfg = ScoreConfig::default();
        let r = reading(80.0, 55.0, 3.5);
        // Sample across one full 5-second wave period
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for i in 0..50 {
            let s = stability(&r, i * 100_000, &cfg);
            min = min.min(s);
            max = max.max(s);
        }
        assert!(max - min <= 2.0 * cfg.wave_amplitude + 1e-4);
    }

    #[test]
    fn baseline_reads_calm() {
        let cfg = ScoreConfig::default();
        // Baseline triple should score clearly on the calm side
        let s = stability(&reading(80.0, 55.0, 3.5), 0, &cfg);
        assert!(s > 0.7, "baseline stability was {s}");
    }
}
