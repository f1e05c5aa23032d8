//! # Enviro Relay Core Library
//!
//! This library provides the building blocks for the enviro-relay agent:
//! a periodic telemetry loop that synthesizes a cyclic temperature/humidity
//! waveform, reports it to a remote HTTP collector, tracks delivery
//! statistics, and mirrors status onto a small two-line character display.
//!
//! ## Design Philosophy
//!
//! ### Single-threaded by intent
//! The agent is one cooperative loop on a current-thread runtime. The only
//! suspension points are the bounded HTTP POST and the short presentation
//! dwells; a slow network lengthens the tick instead of queueing work.
//! There is no shared mutable state outside the [`agent::Agent`] context,
//! so there is nothing to lock.
//!
//! ### Seams over drivers
//! The three external collaborators are traits, not implementations:
//! - the sensor is replaced by [`waveform::WaveformGenerator`] (synthetic),
//! - the display is anything implementing [`display::DisplaySink`],
//! - the network link is anything implementing [`link::LinkProbe`] plus the
//!   [`reporter::Transport`] carrying the actual POST.
//!
//! Production wiring (TCP probe, reqwest transport, console display) lives
//! next to each seam; tests substitute fakes.
//!
//! ## Core Types
//!
//! The crate root exports the value types every module shares:
//! - [`Reading`]: one synthesized measurement pair with its timestamp
//! - [`LinkState`]: the supervisor-owned connectivity state
//! - [`AlertFlags`]: threshold flags derived fresh from each reading

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod agent;
pub mod config;
pub mod display;
pub mod link;
pub mod reporter;
pub mod stats;
pub mod waveform;

/// A single synthesized environment measurement.
///
/// Derived once per tick from elapsed cycle time and consumed immediately
/// by the reporter and the presenter; never stored beyond the tick.
///
/// # Example
/// ```
/// use enviro_relay_lib::Reading;
/// use chrono::Utc;
///
/// let reading = Reading { temperature: 47.5, humidity: 62.5, timestamp: Utc::now() };
/// assert!(reading.temperature < reading.humidity);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Reading {
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity percent
    pub humidity: f32,
    /// Wall-clock moment the reading was synthesized
    pub timestamp: DateTime<Utc>,
}

/// Connectivity state of the collector link.
///
/// Owned by [`link::ConnectivitySupervisor`]; its probe refresh is the only
/// mutation path. Everything else reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
}

impl LinkState {
    /// True when the link is usable for a send attempt.
    pub fn is_connected(self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

/// Threshold flags derived from the current reading.
///
/// Computed fresh every tick against the configured limits and never
/// stored. The rendered alert text joins the temperature label and then
/// the humidity label with a single space; no flags means an empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlertFlags {
    pub high_temperature: bool,
    pub high_humidity: bool,
}

impl AlertFlags {
    const TEMPERATURE_LABEL: &'static str = "High temp";
    const HUMIDITY_LABEL: &'static str = "High humidity";

    /// Evaluate a reading against fixed thresholds.
    pub fn evaluate(reading: &Reading, temperature_limit: f32, humidity_limit: f32) -> Self {
        AlertFlags {
            high_temperature: reading.temperature > temperature_limit,
            high_humidity: reading.humidity > humidity_limit,
        }
    }

    /// True when either flag is raised.
    pub fn any(self) -> bool {
        self.high_temperature || self.high_humidity
    }

    /// Human-readable alert text for the wire payload.
    ///
    /// Fixed ordering: temperature label first, then humidity, separated
    /// by one space. Empty when no flag is raised.
    pub fn text(self) -> String {
        let mut labels = Vec::with_capacity(2);
        if self.high_temperature {
            labels.push(Self::TEMPERATURE_LABEL);
        }
        if self.high_humidity {
            labels.push(Self::HUMIDITY_LABEL);
        }
        labels.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(temperature: f32, humidity: f32) -> Reading {
        Reading {
            temperature,
            humidity,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn both_alerts_compose_in_fixed_order() {
        let flags = AlertFlags::evaluate(&reading(71.0, 76.0), 70.0, 70.0);
        assert!(flags.high_temperature);
        assert!(flags.high_humidity);
        assert_eq!(flags.text(), "High temp High humidity");
    }

    #[test]
    fn humidity_alert_alone() {
        let flags = AlertFlags::evaluate(&reading(69.0, 76.0), 70.0, 70.0);
        assert!(!flags.high_temperature);
        assert!(flags.high_humidity);
        assert_eq!(flags.text(), "High humidity");
    }

    #[test]
    fn thresholds_are_exclusive() {
        // Exactly at the limit is not an alert
        let flags = AlertFlags::evaluate(&reading(70.0, 70.0), 70.0, 70.0);
        assert!(!flags.any());
        assert_eq!(flags.text(), "");
    }

    #[test]
    fn link_state_predicate() {
        assert!(LinkState::Connected.is_connected());
        assert!(!LinkState::Disconnected.is_connected());
    }
}
