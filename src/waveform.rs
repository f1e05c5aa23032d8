//! # Synthetic Sensor Waveform
//!
//! This module stands in for the physical sensor: it synthesizes a
//! deterministic triangular temperature/humidity cycle from elapsed
//! monotonic time. Each cycle ramps linearly from the baseline pair to the
//! peak pair over the first half of the period, then back down over the
//! second half.
//!
//! ## Cadence
//!
//! Cycle boundaries are fixed, not elastic: when a tick lands past the end
//! of a cycle, the start time advances by exactly one period (looped for
//! multi-period overshoot after long network stalls) rather than snapping
//! to "now". The ramp therefore stays phase-locked to the first cycle's
//! start instant no matter how long individual ticks take.
//!
//! ## Phase
//!
//! The generator keeps a [`Phase`] flag that flips Rising → Falling exactly
//! once per cycle, at the 50% progress point. Progress of exactly 0.5 lands
//! in the falling branch, so the transition is deterministic and cannot
//! oscillate. A cycle roll resets the flag to Rising.

use crate::Reading;
use chrono::Utc;
use std::time::{Duration, Instant};

use crate::config::WaveformConfig;

/// Ramp direction within the current cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Rising,
    Falling,
}

/// Deterministic triangular waveform source.
///
/// Owns the cycle start instant and the phase flag; both mutate only
/// through [`WaveformGenerator::sample`].
pub struct WaveformGenerator {
    profile: WaveformConfig,
    cycle_start: Instant,
    phase: Phase,
}

impl WaveformGenerator {
    /// Start a new generator with its first cycle beginning at `start`.
    pub fn new(profile: WaveformConfig, start: Instant) -> Self {
        WaveformGenerator {
            profile,
            cycle_start: start,
            phase: Phase::Rising,
        }
    }

    /// Current ramp direction.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Synthesize the reading for instant `now`, rolling the cycle first if
    /// `now` has passed the end of the current one.
    pub fn sample(&mut self, now: Instant, period: Duration) -> Reading {
        while now.duration_since(self.cycle_start) >= period {
            self.cycle_start += period;
            self.phase = Phase::Rising;
            log::info!("waveform cycle restarted from baseline");
        }

        let elapsed = now.duration_since(self.cycle_start);
        let progress = elapsed.as_secs_f32() / period.as_secs_f32();
        if progress >= 0.5 {
            self.phase = Phase::Falling;
        }

        let (temperature, humidity) = triangle(&self.profile, progress);
        Reading {
            temperature,
            humidity,
            timestamp: Utc::now(),
        }
    }

    /// Whole seconds until the current cycle ends.
    pub fn seconds_to_cycle_end(&self, now: Instant, period: Duration) -> u64 {
        let elapsed = now.duration_since(self.cycle_start);
        period.saturating_sub(elapsed).as_secs()
    }
}

/// Pure triangular profile: baseline → peak over [0, 0.5), peak → baseline
/// over [0.5, 1). `progress` must already be within [0, 1); the caller rolls
/// the cycle before it can exceed that.
fn triangle(profile: &WaveformConfig, progress: f32) -> (f32, f32) {
    let temp_span = profile.peak_temperature - profile.baseline_temperature;
    let hum_span = profile.peak_humidity - profile.baseline_humidity;
    if progress < 0.5 {
        let ramp = progress * 2.0;
        (
            profile.baseline_temperature + temp_span * ramp,
            profile.baseline_humidity + hum_span * ramp,
        )
    } else {
        let ramp = (progress - 0.5) * 2.0;
        (
            profile.peak_temperature - temp_span * ramp,
            profile.peak_humidity - hum_span * ramp,
        )
    }
}
