//! # Status Presentation
//!
//! Renders agent status onto a two-line fixed-width character display
//! (16x2 target form factor). The sink is a trait taking two already-fitted
//! lines; the shipped [`ConsoleDisplay`] draws them as a framed block on
//! stdout, and a real character LCD is one `write_lines` impl away.
//!
//! Formatting is kept in pure functions on [`StatusPresenter`] returning
//! `(String, String)` pairs so every view is testable without a sink.

use crate::reporter::TransportError;
use crate::stats::StatsTracker;
use crate::{LinkState, Reading};

/// Output sink accepting one two-line frame per call.
pub trait DisplaySink {
    fn write_lines(&mut self, top: &str, bottom: &str);
}

/// Development sink: draws each frame as a bordered block on stdout.
pub struct ConsoleDisplay {
    columns: usize,
}

impl ConsoleDisplay {
    pub fn new(columns: usize) -> Self {
        ConsoleDisplay { columns }
    }
}

impl DisplaySink for ConsoleDisplay {
    fn write_lines(&mut self, top: &str, bottom: &str) {
        let border = "-".repeat(self.columns);
        println!("+{}+", border);
        println!("|{}|", top);
        println!("|{}|", bottom);
        println!("+{}+", border);
    }
}

/// Truncate or pad `text` to exactly `width` columns.
pub fn fit_line(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() > width {
        chars.truncate(width);
        return chars.into_iter().collect();
    }
    let mut padded: String = chars.into_iter().collect();
    while padded.chars().count() < width {
        padded.push(' ');
    }
    padded
}

/// Formats every view of the agent for a fixed-width two-line display.
pub struct StatusPresenter {
    columns: usize,
}

impl StatusPresenter {
    pub fn new(columns: usize) -> Self {
        StatusPresenter { columns }
    }

    fn fit(&self, top: String, bottom: String) -> (String, String) {
        (fit_line(&top, self.columns), fit_line(&bottom, self.columns))
    }

    /// Push a view to the sink.
    pub fn show<D: DisplaySink>(&self, sink: &mut D, view: (String, String)) {
        sink.write_lines(&view.0, &view.1);
    }

    /// Boot banner shown before network association.
    pub fn boot(&self) -> (String, String) {
        self.fit("Starting...".to_string(), "enviro-relay".to_string())
    }

    /// Progress of one bounded association attempt.
    pub fn association_attempt(&self, attempt: u32, max_attempts: u32) -> (String, String) {
        self.fit(
            "Joining network".to_string(),
            format!("Attempt {}/{}", attempt, max_attempts),
        )
    }

    /// Association outcome once the gate resolves.
    pub fn association_result(&self, connected: bool) -> (String, String) {
        if connected {
            self.fit("Link ready".to_string(), "enviro-relay".to_string())
        } else {
            self.fit("Link error".to_string(), "Retrying...".to_string())
        }
    }

    /// Steady per-tick view: current readings plus link/delivery status.
    pub fn readings(
        &self,
        reading: &Reading,
        link: LinkState,
        stats: &StatsTracker,
    ) -> (String, String) {
        let top = format!(
            "T:{:.1}C H:{:.0}%",
            reading.temperature, reading.humidity
        );
        let bottom = match link {
            LinkState::Connected => format!("Link OK Sent:{}", stats.successes),
            LinkState::Disconnected => "Link down".to_string(),
        };
        self.fit(top, bottom)
    }

    /// Transient view after a successful send.
    pub fn send_success(&self, status: u16) -> (String, String) {
        self.fit("Sent OK!".to_string(), format!("Code: {}", status))
    }

    /// Transient view after a failed send.
    pub fn send_failure(&self, error: &TransportError) -> (String, String) {
        self.fit("Send error".to_string(), error.to_string())
    }

    /// Shown while a per-tick reconnect attempt runs.
    pub fn reconnecting(&self) -> (String, String) {
        self.fit("Link down".to_string(), "Reconnecting...".to_string())
    }

    /// End-of-tick summary: time to the next cycle and running totals.
    pub fn cycle_summary(
        &self,
        seconds_to_cycle_end: u64,
        reading: &Reading,
        stats: &StatsTracker,
    ) -> (String, String) {
        let top = format!(
            "Next:{}s T:{:.0}",
            seconds_to_cycle_end, reading.temperature
        );
        let bottom = format!("OK:{} Err:{}", stats.successes, stats.failures);
        self.fit(top, bottom)
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

    fn presenter() -> StatusPresenter {
        StatusPresenter::new(16)
    }

    #[test]
    fn fit_line_pads_and_truncates() {
        assert_eq!(fit_line("abc", 5), "abc  ");
        assert_eq!(fit_line("abcdef", 4), "abcd");
        assert_eq!(fit_line("", 3), "   ");
        assert_eq!(fit_line("xyz", 0), "");
    }

    #[test]
    fn every_view_is_exactly_two_fixed_width_lines() {
        let p = presenter();
        let stats = StatsTracker::new();
        let r = reading(47.5, 62.6);
        let views = [
            p.boot(),
            p.association_attempt(3, 15),
            p.association_result(true),
            p.association_result(false),
            p.readings(&r, LinkState::Connected, &stats),
            p.readings(&r, LinkState::Disconnected, &stats),
            p.send_success(200),
            p.send_failure(&TransportError::Timeout),
            p.reconnecting(),
            p.cycle_summary(45, &r, &stats),
        ];
        for (top, bottom) in views {
            assert_eq!(top.chars().count(), 16, "top line: {:?}", top);
            assert_eq!(bottom.chars().count(), 16, "bottom line: {:?}", bottom);
        }
    }

    #[test]
    fn readings_view_shows_values_and_link_state() {
        let p = presenter();
        let mut stats = StatsTracker::new();
        stats.successes = 12;
        let (top, bottom) = p.readings(&reading(47.5, 62.6), LinkState::Connected, &stats);
        assert!(top.starts_with("T:47.5C H:63%"));
        assert!(bottom.starts_with("Link OK Sent:12"));

        let (_, bottom) = p.readings(&reading(47.5, 62.6), LinkState::Disconnected, &stats);
        assert!(bottom.starts_with("Link down"));
    }

    #[test]
    fn success_and_failure_dwells_are_distinguishable() {
        let p = presenter();
        let success = p.send_success(201);
        let failure = p.send_failure(&TransportError::ConnectionFailed);
        assert!(success.0.starts_with("Sent OK!"));
        assert!(success.1.starts_with("Code: 201"));
        assert!(failure.0.starts_with("Send error"));
        // 16 columns truncate the full description
        assert_eq!(failure.1, "connection faile");
        assert_ne!(success.0, failure.0);
    }

    #[test]
    fn cycle_summary_shows_countdown_and_totals() {
        let p = presenter();
        let mut stats = StatsTracker::new();
        stats.successes = 12;
        stats.failures = 3;
        let (top, bottom) = p.cycle_summary(45, &reading(47.2, 60.0), &stats);
        assert!(top.starts_with("Next:45s T:47"));
        assert!(bottom.starts_with("OK:12 Err:3"));
    }
}
