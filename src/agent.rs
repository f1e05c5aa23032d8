//! # Agent Main Loop
//!
//! The single-owner session context: it holds the generator, supervisor,
//! reporter, statistics, and display sink, and drives them on a fixed
//! polling cadence. There are no ambient globals; everything mutable lives
//! in [`Agent`] and is touched only from its own tick.
//!
//! ## Startup Gate
//!
//! Before the first tick the agent must associate with the network: a
//! bounded run of attempts (15, one second apart), then an indefinite
//! blocking retry state with longer waits. Nothing ticks until the gate
//! opens; total startup failure is loud but never fatal.
//!
//! ## Tick
//!
//! Per tick, in order: sample the waveform (rolling the cycle as needed),
//! render the steady view, compute alert flags, then branch on the link —
//! down: one bounded reconnect attempt plus the reconnect view, skip to
//! the next tick; up: send, record, show the result dwell, and render the
//! time-to-next-cycle summary. No branch bypasses the statistics update
//! when the link is up. The loop never terminates; every failure path
//! degrades to "try again next tick".

use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::config::Config;
use crate::display::{DisplaySink, StatusPresenter};
use crate::link::{ConnectivitySupervisor, LinkProbe};
use crate::reporter::{DeliveryOutcome, TelemetryReporter, Transport};
use crate::stats::StatsTracker;
use crate::waveform::WaveformGenerator;
use crate::{AlertFlags, LinkState};

/// The telemetry agent: one cooperative loop over all owned state.
pub struct Agent<P: LinkProbe, T: Transport, D: DisplaySink> {
    config: Config,
    waveform: WaveformGenerator,
    link: ConnectivitySupervisor<P>,
    reporter: TelemetryReporter<T>,
    stats: StatsTracker,
    presenter: StatusPresenter,
    display: D,
}

impl<P: LinkProbe, T: Transport, D: DisplaySink> Agent<P, T, D> {
    pub fn new(config: Config, probe: P, transport: T, display: D) -> Self {
        let waveform = WaveformGenerator::new(config.waveform.clone(), Instant::now());
        let reporter = TelemetryReporter::new(transport, config.collector.group_id);
        let presenter = StatusPresenter::new(config.display.columns);
        Agent {
            waveform,
            link: ConnectivitySupervisor::new(probe),
            reporter,
            stats: StatsTracker::new(),
            presenter,
            display,
            config,
        }
    }

    /// Running delivery totals.
    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Last observed link state.
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Startup gate: block until the network is associated.
    ///
    /// Bounded attempts first, then the indefinite retry state. Returns
    /// only once the link is up; the first tick follows immediately.
    pub async fn associate(&mut self) {
        let view = self.presenter.boot();
        self.presenter.show(&mut self.display, view);
        log::info!(
            "starting up; collector {} group {}",
            self.config.collector.endpoint,
            self.config.collector.group_id
        );

        let max_attempts = self.config.timing.startup_attempts;
        for attempt in 1..=max_attempts {
            let view = self.presenter.association_attempt(attempt, max_attempts);
            self.presenter.show(&mut self.display, view);
            if self.link.is_up() {
                log::info!("network associated on attempt {}", attempt);
                let view = self.presenter.association_result(true);
                self.presenter.show(&mut self.display, view);
                return;
            }
            sleep(Duration::from_secs(self.config.timing.startup_retry_secs)).await;
        }

        // Bounded attempts exhausted: degenerate single-state retry loop.
        log::error!(
            "network association failed after {} attempts; blocking until it succeeds",
            max_attempts
        );
        let view = self.presenter.association_result(false);
        self.presenter.show(&mut self.display, view);
        loop {
            sleep(Duration::from_secs(self.config.timing.startup_fallback_secs)).await;
            log::info!("retrying network association");
            if self.link.is_up() {
                log::info!("network associated after extended retry");
                let view = self.presenter.association_result(true);
                self.presenter.show(&mut self.display, view);
                return;
            }
        }
    }

    /// One pass of the polling loop.
    pub async fn tick(&mut self) {
        let now = Instant::now();
        let period = self.config.cycle_period();
        let reading = self.waveform.sample(now, period);

        let view = self.presenter.readings(&reading, self.link.state(), &self.stats);
        self.presenter.show(&mut self.display, view);

        let alerts = AlertFlags::evaluate(
            &reading,
            self.config.alerts.high_temperature,
            self.config.alerts.high_humidity,
        );
        if alerts.any() {
            log::warn!("alert raised: {}", alerts.text());
        }

        if !self.link.is_up() {
            let view = self.presenter.reconnecting();
            self.presenter.show(&mut self.display, view);
            let wait = Duration::from_secs(self.config.timing.reconnect_wait_secs);
            self.link.attempt_reconnect(wait).await;
            sleep(Duration::from_millis(self.config.timing.reconnect_dwell_ms)).await;
            return;
        }

        let outcome = self.reporter.send(&reading, alerts, &mut self.stats).await;
        match &outcome {
            DeliveryOutcome::Success { status, .. } => {
                let view = self.presenter.send_success(*status);
                self.presenter.show(&mut self.display, view);
                sleep(Duration::from_millis(self.config.timing.success_dwell_ms)).await;
            }
            DeliveryOutcome::Failed(error) => {
                let view = self.presenter.send_failure(error);
                self.presenter.show(&mut self.display, view);
                sleep(Duration::from_millis(self.config.timing.failure_dwell_ms)).await;
            }
        }

        let view = self.presenter.cycle_summary(
            self.waveform.seconds_to_cycle_end(now, period),
            &reading,
            &self.stats,
        );
        self.presenter.show(&mut self.display, view);
    }

    /// Run forever at the fixed cadence. Slow ticks stretch; they are never
    /// queued or dropped.
    pub async fn run(&mut self) {
        loop {
            self.tick().await;
            sleep(self.config.tick_interval()).await;
        }
    }
}
