//! Session orchestrator.
//!
//! One session owns the whole pipeline: sample source, history, classifier
//! inputs, episode state machine and breathing pacer. A single `tick(now_us)`
//! entry point advances everything in a fixed order from one logical clock —
//! queued external pushes first, then the synthetic cadence, then the
//! episode timers, then the pacer — so no two timers ever race and a tick is
//! atomic with respect to the next.

use crate::classifier::classify;
use crate::config::{ConfigError, EngineConfig, Thresholds};
use crate::domain::{
    BreathingPhase, Classification, Effect, EmotionPreset, EpisodeState, Reading, ScoredReading,
};
use crate::episode::{recovery_holds, EpisodeMachine};
use crate::history::History;
use crate::pacer::BreathingPacer;
use crate::score::stability;
use crate::source::{reading_from_push, SyntheticSource};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Read-only view of the session for a presentation layer to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Most recent raw reading, if any sample has been processed.
    pub reading: Option<Reading>,
    /// Most recent scored reading (stability index attached).
    pub scored: Option<ScoredReading>,
    /// Last classification result (tier and trend slopes).
    pub classification: Classification,
    /// Episode lifecycle state, including remaining countdown seconds.
    pub episode: EpisodeState,
    /// Breathing guide phase while intervening, `None` otherwise.
    pub breathing_phase: Option<BreathingPhase>,
    /// Breathing guide scale factor (1.0 when the pacer is stopped).
    pub breathing_scale: f32,
    /// Whether calming audio has been requested.
    pub audio_playing: bool,
    /// Whether the synthetic sampler is running.
    pub sampling: bool,
    /// Set once the first external push has arrived.
    pub source_connected: bool,
}

pub struct Session {
    config: EngineConfig,
    history: History,
    episode: EpisodeMachine,
    pacer: BreathingPacer,
    synth: SyntheticSource,
    /// Pushes arriving between ticks; drained at the next tick boundary so
    /// they never interleave with a partially processed sample.
    push_queue: VecDeque<f32>,
    source_connected: bool,
    sampling: bool,
    last_sample_us: Option<i64>,
    last_tick_us: Option<i64>,
    current: Option<ScoredReading>,
    classification: Classification,
    audio_playing: bool,
}

impl Session {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let synth = SyntheticSource::new(config.sampling);
        Ok(Self::from_parts(config, synth))
    }

    /// Deterministic constructor for tests: seeds the synthetic generator.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let synth = SyntheticSource::with_seed(config.sampling, seed);
        Ok(Self::from_parts(config, synth))
    }

    fn from_parts(config: EngineConfig, synth: SyntheticSource) -> Self {
        Self {
            episode: EpisodeMachine::new(config.episode),
            pacer: BreathingPacer::new(config.pacer),
            synth,
            config,
            history: History::new(),
            push_queue: VecDeque::new(),
            source_connected: false,
            sampling: false,
            last_sample_us: None,
            last_tick_us: None,
            current: None,
            classification: Classification::default(),
            audio_playing: false,
        }
    }

    // ------------------------------------------------------------------
    // Control interface
    // ------------------------------------------------------------------

    /// Begin synthetic sampling. The first sample is emitted one sampling
    /// interval after this call.
    pub fn start_sampling(&mut self, now_us: i64) {
        if !self.sampling {
            self.sampling = true;
            self.last_sample_us = Some(now_us);
            log::debug!("sampling started");
        }
    }

    /// Stop the synthetic sampler. Cancels any pending ticks and any
    /// in-flight countdown immediately: the episode machine resets to Idle
    /// and the pacer and audio are released synchronously.
    pub fn stop_sampling(&mut self) -> Vec<Effect> {
        self.sampling = false;
        self.last_sample_us = None;
        let effects = self.episode.reset();
        self.apply_effects(&effects);
        log::debug!("sampling stopped, episode cleared");
        effects
    }

    /// Force-reset to baseline: generator back to resting values, history
    /// cleared, episode Idle, pacer and audio released. Works from any state.
    pub fn reset(&mut self, now_us: i64) -> Vec<Effect> {
        self.synth.reset();
        self.history.clear();
        self.push_queue.clear();
        let effects = self.episode.reset();
        self.apply_effects(&effects);
        let baseline = Reading::clamped(
            now_us,
            crate::source::BASELINE.0,
            crate::source::BASELINE.1,
            crate::source::BASELINE.2,
        );
        self.current = Some(ScoredReading {
            reading: baseline,
            stability: stability(&baseline, now_us, &self.config.score),
        });
        self.classification = Classification::default();
        log::debug!("session reset to baseline");
        effects
    }

    /// Jump the signal to a named emotional state and run it through the
    /// normal pipeline immediately, without waiting for organic drift.
    pub fn apply_preset(&mut self, preset: EmotionPreset, now_us: i64) -> Vec<Effect> {
        let (hr, hrv, eda) = preset.values();
        self.synth.set_values(hr, hrv, eda);
        let reading = Reading::clamped(now_us, hr, hrv, eda);
        self.process_reading(reading)
    }

    // ------------------------------------------------------------------
    // Inbound reading injection
    // ------------------------------------------------------------------

    /// Accept an externally pushed heart-rate value (e.g. from a watch
    /// bridge). May be called at any time; the value is queued and processed
    /// at the next tick boundary. Non-finite values are dropped without
    /// touching any state.
    pub fn push_heart_rate(&mut self, hr: f32) {
        if !hr.is_finite() {
            log::warn!("dropping non-finite pushed heart rate");
            return;
        }
        self.push_queue.push_back(hr);
    }

    // ------------------------------------------------------------------
    // Configuration interface
    // ------------------------------------------------------------------

    pub fn thresholds(&self) -> Thresholds {
        self.config.thresholds
    }

    /// Out-of-bounds values are clamped to the documented range, not rejected.
    pub fn set_hr_max(&mut self, v: f32) {
        self.config.thresholds.set_hr_max(v);
    }

    pub fn set_hrv_min(&mut self, v: f32) {
        self.config.thresholds.set_hrv_min(v);
    }

    pub fn set_eda_max(&mut self, v: f32) {
        self.config.thresholds.set_eda_max(v);
    }

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    /// Advance the session to `now_us`. Dispatch order is fixed: drain
    /// queued pushes, emit a synthetic sample if the cadence elapsed, advance
    /// the episode timers, then the pacer. Returns every effect request
    /// raised during this tick, in order, for an outer driver (the requests
    /// have already been applied to the in-core pacer and audio flag).
    pub fn tick(&mut self, now_us: i64) -> Vec<Effect> {
        let dt_us = match self.last_tick_us {
            Some(last) => crate::domain::dt_us(now_us, last),
            None => 0,
        };
        self.last_tick_us = Some(now_us);
        // Whether the pacer was already running when this tick began: time
        // that elapsed before a StartPacer raised within this tick belongs
        // to the pre-intervention period, not to the first inhale.
        let pacer_was_running = self.pacer.is_running();

        let mut effects = Vec::new();

        // 1. Queued external pushes, in arrival order
        while let Some(hr) = self.push_queue.pop_front() {
            self.source_connected = true;
            let reading = reading_from_push(now_us, hr);
            effects.extend(self.process_reading(reading));
        }

        // 2. Synthetic cadence: one sample per tick at most, stamped with
        //    actual wall-clock time so trend math stays correct under jitter
        if self.sampling {
            let due = self
                .last_sample_us
                .map(|last| crate::domain::dt_us(now_us, last) >= self.config.sampling.interval_us)
                .unwrap_or(true);
            if due {
                self.last_sample_us = Some(now_us);
                let intervening = self.episode.state() == EpisodeState::Intervening;
                let reading = self.synth.next_reading(now_us, intervening);
                effects.extend(self.process_reading(reading));
            }
        }

        // 3. Episode timers (countdown decrement, recovery confirmation)
        let recovered = self
            .current
            .map(|s| recovery_holds(&s.reading, &self.config.thresholds, &self.config.episode))
            .unwrap_or(false);
        let episode_fx = self.episode.tick(now_us, recovered);
        self.apply_effects(&episode_fx);
        effects.extend(episode_fx);

        // 4. Breathing pacer: a pacer started during this tick keeps its
        //    full first phase; its clock begins now
        if pacer_was_running {
            self.pacer.tick(dt_us);
        }

        effects
    }

    // ------------------------------------------------------------------
    // Observation interface
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        let guide = self.pacer.guide();
        Snapshot {
            reading: self.current.map(|s| s.reading),
            scored: self.current,
            classification: self.classification,
            episode: self.episode.state(),
            breathing_phase: guide.map(|(p, _)| p),
            breathing_scale: guide
                .map(|(_, s)| s)
                .unwrap_or(BreathingPacer::NEUTRAL_SCALE),
            audio_playing: self.audio_playing,
            sampling: self.sampling,
            source_connected: self.source_connected,
        }
    }

    pub fn episode_state(&self) -> EpisodeState {
        self.episode.state()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ------------------------------------------------------------------
    // Private
    // ------------------------------------------------------------------

    /// Score, record, classify and feed the episode machine — the atomic
    /// per-reading unit of work.
    fn process_reading(&mut self, reading: Reading) -> Vec<Effect> {
        let scored = ScoredReading {
            reading,
            stability: stability(&reading, reading.ts_us, &self.config.score),
        };
        self.history.push(scored);

        let classification = classify(&reading, &self.history, &self.config.thresholds);
        if classification.tier != self.classification.tier {
            log::debug!(
                "risk tier {:?} -> {:?}",
                self.classification.tier,
                classification.tier
            );
        }
        self.current = Some(scored);
        self.classification = classification;

        let effects = self.episode.observe(classification.tier, reading.ts_us);
        self.apply_effects(&effects);
        effects
    }

    fn apply_effects(&mut self, effects: &[Effect]) {
        for fx in effects {
            match fx {
                Effect::StartPacer => self.pacer.start(),
                Effect::StopPacer => self.pacer.stop(),
                Effect::StartAudio => self.audio_playing = true,
                Effect::StopAudio => self.audio_playing = false,
            }
        }
    }
}
