//! Episode lifecycle state machine.
//!
//! Owns the idle -> counting-down -> intervening -> idle cycle. The machine
//! is pure in the effect sense: transitions return declarative [`Effect`]
//! requests and the session driver executes them. All timing is derived from
//! caller-supplied timestamps, never from an internal clock.

use crate::config::{EpisodeConfig, Thresholds};
use crate::domain::{Effect, EpisodeState, Reading, RiskTier};

/// Does `reading` satisfy the recovery condition for exiting intervention?
///
/// hr must be back under the alarm threshold, hrv above the recovery floor,
/// eda below the recovery ceiling. One passing sample is not enough — the
/// machine requires the condition to hold for a sustained confirmation
/// window before exiting.
pub fn recovery_holds(reading: &Reading, thresholds: &Thresholds, cfg: &EpisodeConfig) -> bool {
    reading.hr < thresholds.hr_max
        && reading.hrv > cfg.recovery_hrv_min
        && reading.eda < cfg.recovery_eda_max
}

#[derive(Debug, Clone)]
pub struct EpisodeMachine {
    cfg: EpisodeConfig,
    state: EpisodeState,
    /// While counting down: timestamp of the next one-second decrement.
    next_decrement_us: i64,
    /// While intervening: when the recovery condition started holding.
    recovery_since_us: Option<i64>,
}

impl EpisodeMachine {
    pub fn new(cfg: EpisodeConfig) -> Self {
        Self {
            cfg,
            state: EpisodeState::Idle,
            next_decrement_us: 0,
            recovery_since_us: None,
        }
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Feed one classification result.
    ///
    /// A High tier from Idle opens the warning window. While already counting
    /// down or intervening, further High classifications have no effect
    /// (re-entry is forbidden). Returns any effect requests.
    pub fn observe(&mut self, tier: RiskTier, now_us: i64) -> Vec<Effect> {
        if tier == RiskTier::High && self.state == EpisodeState::Idle {
            self.state = EpisodeState::CountingDown {
                remaining_secs: self.cfg.warning_secs,
            };
            self.next_decrement_us = now_us + 1_000_000;
            log::debug!(
                "high risk detected, warning window opened: {}s",
                self.cfg.warning_secs
            );
        }
        Vec::new()
    }

    /// Advance wall-clock driven transitions: countdown decrements and the
    /// recovery confirmation window. `recovered` is whether the latest
    /// reading satisfies [`recovery_holds`].
    pub fn tick(&mut self, now_us: i64, recovered: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.state {
            EpisodeState::Idle => {}
            EpisodeState::CountingDown { mut remaining_secs } => {
                // One decrement per elapsed whole second, never skipping a
                // value even if the host delayed us past several boundaries.
                while now_us >= self.next_decrement_us {
                    self.next_decrement_us += 1_000_000;
                    remaining_secs -= 1;
                    if remaining_secs == 0 {
                        self.state = EpisodeState::Intervening;
                        self.recovery_since_us = None;
                        effects.push(Effect::StartPacer);
                        effects.push(Effect::StartAudio);
                        log::debug!("countdown elapsed, intervention started");
                        return effects;
                    }
                    self.state = EpisodeState::CountingDown { remaining_secs };
                }
            }
            EpisodeState::Intervening => {
                if recovered {
                    let since = *self.recovery_since_us.get_or_insert(now_us);
                    if crate::domain::dt_us(now_us, since) >= self.cfg.recovery_confirm_us {
                        self.state = EpisodeState::Idle;
                        self.recovery_since_us = None;
                        effects.push(Effect::StopPacer);
                        effects.push(Effect::StopAudio);
                        log::debug!("recovery confirmed, intervention ended");
                    }
                } else if self.recovery_since_us.take().is_some() {
                    // Regression during the confirmation window: restart it
                    log::debug!("recovery regressed, confirmation window reset");
                }
            }
        }
        effects
    }

    /// Unconditional reset to Idle from any state. Side effects are cleared
    /// regardless of the current state; the driver treats the stop requests
    /// as idempotent.
    pub fn reset(&mut self) -> Vec<Effect> {
        self.state = EpisodeState::Idle;
        self.recovery_since_us = None;
        vec![Effect::StopPacer, Effect::StopAudio]
    }
}
