//! Risk classifier.
//!
//! Pure function of (reading, history, thresholds): no hidden state, so the
//! same inputs always produce the same tier.

use crate::config::Thresholds;
use crate::domain::{dt_sec, Classification, Reading, RiskTier};
use crate::history::History;

/// Heart-rate slope above this (bpm/s) flags a rising trend.
const HR_TREND_HIGH: f32 = 0.9;
/// HRV slope below this (ms/s) flags a collapsing trend.
const HRV_TREND_LOW: f32 = -0.35;

/// Classify the escalation risk of `reading` given recent history.
///
/// Threshold breaches are evaluated against the current reading; trend
/// slopes are computed over the last-5 window only once the history holds at
/// least that many entries. Slopes divide by the measured elapsed time
/// between the window endpoints, so the math stays correct when the host
/// delays a tick. Tier precedence: High, then Medium, then Low.
pub fn classify(reading: &Reading, history: &History, thresholds: &Thresholds) -> Classification {
    let hr_over = reading.hr > thresholds.hr_max;
    let hrv_under = reading.hrv < thresholds.hrv_min;
    let eda_over = reading.eda > thresholds.eda_max;

    let (hr_trend, hrv_trend) = match history.trend_endpoints() {
        Some((oldest, newest)) => {
            let elapsed = dt_sec(newest.reading.ts_us, oldest.reading.ts_us);
            if elapsed > 0.0 {
                (
                    (newest.reading.hr - oldest.reading.hr) / elapsed,
                    (newest.reading.hrv - oldest.reading.hrv) / elapsed,
                )
            } else {
                (0.0, 0.0)
            }
        }
        None => (0.0, 0.0),
    };

    let hr_trend_high = hr_trend > HR_TREND_HIGH;
    let hrv_trend_low = hrv_trend < HRV_TREND_LOW;

    let tier = if hr_over || eda_over || (hr_trend_high && hrv_trend_low) {
        RiskTier::High
    } else if hrv_under || hr_trend_high || hrv_trend_low {
        RiskTier::Medium
    } else {
        RiskTier::Low
    };

    Classification {
        tier,
        hr_trend,
        hrv_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoredReading;

    fn reading(ts_us: i64, hr: f32, hrv: f32, eda: f32) -> Reading {
        Reading { ts_us, hr, hrv, eda }
    }

    fn push(history: &mut History, r: Reading) {
        history.push(ScoredReading {
            reading: r,
            stability: 0.5,
        });
    }

    #[test]
    fn calm_reading_is_low() {
        let h = History::new();
        let c = classify(
            &reading(0, 80.0, 55.0, 3.5),
            &h,
            &Thresholds::default(),
        );
        assert_eq!(c.tier, RiskTier::Low);
        assert_eq!(c.hr_trend, 0.0);
    }

    #[test]
    fn hr_over_threshold_is_high() {
        let h = History::new();
        let c = classify(
            &reading(0, 101.0, 55.0, 3.5),
            &h,
            &Thresholds::default(),
        );
        assert_eq!(c.tier, RiskTier::High);
    }

    #[test]
    fn eda_over_threshold_is_high() {
        let h = History::new();
        let c = classify(&reading(0, 80.0, 55.0, 6.5), &h, &Thresholds::default());
        assert_eq!(c.tier, RiskTier::High);
    }

    #[test]
    fn hrv_under_threshold_is_medium() {
        let h = History::new();
        let c = classify(&reading(0, 80.0, 30.0, 3.5), &h, &Thresholds::default());
        assert_eq!(c.tier, RiskTier::Medium);
    }

    #[test]
    fn all_breached_is_high() {
        let h = History::new();
        let c = classify(&reading(0, 110.0, 30.0, 8.0), &h, &Thresholds::default());
        assert_eq!(c.tier, RiskTier::High);
    }

    #[test]
    fn combined_trends_escalate_to_high() {
        let mut h = History::new();
        // hr climbing 2 bpm per 0.2 s (10 bpm/s), hrv falling 1 ms per 0.2 s
        for i in 0..5i64 {
            push(
                &mut h,
                reading(i * 200_000, 80.0 + 2.0 * i as f32, 55.0 - 1.0 * i as f32, 3.5),
            );
        }
        let current = reading(800_000, 88.0, 51.0, 3.5);
        let c = classify(&current, &h, &Thresholds::default());
        assert!(c.hr_trend > HR_TREND_HIGH);
        assert!(c.hrv_trend < HRV_TREND_LOW);
        assert_eq!(c.tier, RiskTier::High);
    }

    #[test]
    fn rising_hr_alone_is_medium() {
        let mut h = History::new();
        for i in 0..5i64 {
            push(&mut h, reading(i * 200_000, 80.0 + 2.0 * i as f32, 55.0, 3.5));
        }
        let c = classify(&reading(800_000, 88.0, 55.0, 3.5), &h, &Thresholds::default());
        assert!(c.hr_trend > HR_TREND_HIGH);
        assert_eq!(c.tier, RiskTier::Medium);
    }

    #[test]
    fn trend_uses_measured_elapsed_time() {
        let mut h = History::new();
        // Same hr delta over the window but stretched to double the nominal
        // spacing: the slope must halve.
        for i in 0..5i64 {
            push(&mut h, reading(i * 400_000, 80.0 + 2.0 * i as f32, 55.0, 3.5));
        }
        let c = classify(&reading(1_600_000, 88.0, 55.0, 3.5), &h, &Thresholds::default());
        assert!((c.hr_trend - 5.0).abs() < 1e-3, "got {}", c.hr_trend);
    }

    #[test]
    fn deterministic() {
        let mut h = History::new();
        for i in 0..5i64 {
            push(&mut h, reading(i * 200_000, 90.0, 40.0, 5.0));
        }
        let r = reading(800_000, 95.0, 38.0, 5.5);
        let t = Thresholds::default();
        assert_eq!(classify(&r, &h, &t), classify(&r, &h, &t));
    }
}
