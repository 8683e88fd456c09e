//! Breathing pacer.
//!
//! Independent two-phase toggler started and stopped by episode effects.
//! While running it alternates Inhale/Exhale every half cycle (4 s by
//! default, an 8 s full cycle), each phase entry carrying the scale factor
//! the presentation layer animates toward.

use crate::config::PacerConfig;
use crate::domain::BreathingPhase;

#[derive(Debug, Clone)]
pub struct BreathingPacer {
    cfg: PacerConfig,
    running: bool,
    phase: BreathingPhase,
    elapsed_us: u64,
    scale: f32,
}

impl BreathingPacer {
    /// Scale factor reported while the pacer is stopped.
    pub const NEUTRAL_SCALE: f32 = 1.0;

    pub fn new(cfg: PacerConfig) -> Self {
        Self {
            cfg,
            running: false,
            phase: BreathingPhase::Inhale,
            elapsed_us: 0,
            scale: Self::NEUTRAL_SCALE,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current phase and scale, or `None` while stopped.
    pub fn guide(&self) -> Option<(BreathingPhase, f32)> {
        self.running.then_some((self.phase, self.scale))
    }

    /// Begin pacing on an inhale. Starting while already started is a no-op.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.phase = BreathingPhase::Inhale;
        self.elapsed_us = 0;
        self.scale = BreathingPhase::Inhale.scale();
    }

    /// Halt immediately and reset the scale to neutral. No further toggles
    /// occur after this returns.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_us = 0;
        self.scale = Self::NEUTRAL_SCALE;
    }

    /// Advance by `dt_us`, returning each phase entered during the interval
    /// in order. A stopped pacer consumes time without toggling.
    pub fn tick(&mut self, mut dt_us: u64) -> Vec<BreathingPhase> {
        let mut entered = Vec::new();
        // A zero half cycle would make the loop below consume no time per
        // toggle; treat it as degenerate and hold the current phase.
        if !self.running || self.cfg.half_cycle_us == 0 {
            return entered;
        }
        while dt_us > 0 {
            let left = self.cfg.half_cycle_us.saturating_sub(self.elapsed_us);
            if dt_us < left {
                self.elapsed_us += dt_us;
                break;
            }
            dt_us -= left;
            self.elapsed_us = 0;
            self.phase = match self.phase {
                BreathingPhase::Inhale => BreathingPhase::Exhale,
                BreathingPhase::Exhale => BreathingPhase::Inhale,
            };
            self.scale = self.phase.scale();
            entered.push(self.phase);
        }
        entered
    }
}
