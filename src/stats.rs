//! Running delivery statistics.
//!
//! Process-lifetime counters over send attempts. Counters are monotonic;
//! there is no reset. The tracker is owned by the agent context and mutated
//! only through [`StatsTracker::record`].

use crate::reporter::DeliveryOutcome;

/// Attempt/success/failure counters with a derived success rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsTracker {
    pub attempts: u32,
    pub successes: u32,
    pub failures: u32,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one classified attempt: attempts always advance, and exactly
    /// one of successes/failures advances with it.
    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        self.attempts += 1;
        match outcome {
            DeliveryOutcome::Success { .. } => self.successes += 1,
            DeliveryOutcome::Failed(_) => self.failures += 1,
        }
        log::info!(
            "delivery totals: attempts={} ok={} failed={} rate={:.1}%",
            self.attempts,
            self.successes,
            self.failures,
            self.success_rate()
        );
    }

    /// Percentage of successful attempts. Defined as 0.0 before the first
    /// attempt so the idle display never divides by zero.
    pub fn success_rate(&self) -> f32 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f32 / self.attempts as f32 * 100.0
    }
}
