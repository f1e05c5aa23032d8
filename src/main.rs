//! # Enviro Relay Application Entry Point
//!
//! This binary wires the production seams together — TCP link probe,
//! reqwest transport, console display — and hands them to the agent loop.
//! `--once` runs the startup gate plus a single tick and exits, which is
//! handy for development and smoke testing without the endless cadence.

// Test modules
#[cfg(test)]
mod tests;

// Re-export library types for internal use
pub use enviro_relay_lib::config::Config;

use anyhow::Context;
use enviro_relay_lib::agent::Agent;
use enviro_relay_lib::display::ConsoleDisplay;
use enviro_relay_lib::link::TcpProbe;
use enviro_relay_lib::reporter::HttpTransport;
use std::env;
use std::time::Duration;

/// Derive the `host:port` the link probe watches from the collector URL.
fn probe_target(endpoint: &str) -> anyhow::Result<String> {
    let url = reqwest::Url::parse(endpoint)
        .with_context(|| format!("invalid collector endpoint: {}", endpoint))?;
    let host = url
        .host_str()
        .context("collector endpoint has no host")?
        .to_string();
    let port = url
        .port_or_known_default()
        .context("collector endpoint has no port")?;
    Ok(format!("{}:{}", host, port))
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Development mode: run exactly one tick after the startup gate
    let run_once = env::args().any(|arg| arg == "--once");

    let config = Config::load();

    let probe = TcpProbe::new(
        &probe_target(&config.collector.endpoint)?,
        Duration::from_secs(config.timing.probe_timeout_secs),
    )
    .context("resolving collector address")?;
    let transport = HttpTransport::new(&config.collector.endpoint, config.request_timeout())
        .context("building HTTP transport")?;
    let display = ConsoleDisplay::new(config.display.columns);

    // The loop is strictly sequential; a current-thread runtime is all it needs
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut agent = Agent::new(config, probe, transport, display);
        agent.associate().await;
        if run_once {
            agent.tick().await;
        } else {
            agent.run().await;
        }
    });

    Ok(())
}
