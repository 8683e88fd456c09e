//! Property-based invariants for the detection pipeline.

use crate::classifier::classify;
use crate::config::{ScoreConfig, Thresholds};
use crate::domain::{Reading, ScoredReading};
use crate::history::History;
use crate::score::stability;
use crate::source::derive_from_hr;
use proptest::prelude::*;

fn arb_reading() -> impl Strategy<Value = Reading> {
    (
        0i64..10_000_000_000,
        60.0f32..=140.0,
        20.0f32..=80.0,
        1.0f32..=10.0,
    )
        .prop_map(|(ts_us, hr, hrv, eda)| Reading { ts_us, hr, hrv, eda })
}

proptest! {
    /// Clamp invariant: any in-range reading at any instant scores in [0, 1].
    #[test]
    fn score_always_in_unit_interval(r in arb_reading(), now_us in 0i64..10_000_000_000) {
        let s = stability(&r, now_us, &ScoreConfig::default());
        prop_assert!((0.0..=1.0).contains(&s));
    }

    /// The clamp holds even for wildly out-of-range raw inputs.
    #[test]
    fn score_clamps_extreme_inputs(
        hr in -1000.0f32..1000.0,
        hrv in -1000.0f32..1000.0,
        eda in -1000.0f32..1000.0,
        now_us in 0i64..10_000_000_000,
    ) {
        let r = Reading { ts_us: now_us, hr, hrv, eda };
        let s = stability(&r, now_us, &ScoreConfig::default());
        prop_assert!((0.0..=1.0).contains(&s));
    }

    /// Same (reading, history, thresholds) triple, same tier.
    #[test]
    fn classifier_is_deterministic(readings in prop::collection::vec(arb_reading(), 1..12)) {
        let mut history = History::new();
        let cfg = ScoreConfig::default();
        let mut sorted = readings;
        sorted.sort_by_key(|r| r.ts_us);
        for r in &sorted {
            history.push(ScoredReading { reading: *r, stability: stability(r, r.ts_us, &cfg) });
        }
        let current = *sorted.last().unwrap();
        let t = Thresholds::default();
        let a = classify(&current, &history, &t);
        let b = classify(&current, &history, &t);
        prop_assert_eq!(a, b);
    }

    /// Ring-buffer invariant: history never exceeds its capacity.
    #[test]
    fn history_never_exceeds_capacity(n in 0usize..600) {
        let mut history = History::new();
        for i in 0..n {
            history.push(ScoredReading {
                reading: Reading { ts_us: i as i64, hr: 80.0, hrv: 55.0, eda: 3.5 },
                stability: 0.85,
            });
            prop_assert!(history.len() <= History::CAPACITY);
        }
    }

    /// Push-relay derivation stays inside the documented floors/ceilings.
    #[test]
    fn push_derivation_bounded(hr in 0.0f32..=250.0) {
        let (hrv, eda) = derive_from_hr(hr);
        prop_assert!((30.0..=55.0).contains(&hrv));
        prop_assert!((3.5..=8.0).contains(&eda));
        if hr <= 100.0 {
            prop_assert_eq!((hrv, eda), (55.0, 3.5));
        }
    }

    /// Threshold setters clamp any input into the documented bounds.
    #[test]
    fn threshold_setters_always_in_bounds(v in -1000.0f32..1000.0) {
        let mut t = Thresholds::default();
        t.set_hr_max(v);
        prop_assert!((80.0..=120.0).contains(&t.hr_max));
        t.set_hrv_min(v);
        prop_assert!((20.0..=50.0).contains(&t.hrv_min));
        t.set_eda_max(v);
        prop_assert!((4.0..=8.0).contains(&t.eda_max));
    }
}
