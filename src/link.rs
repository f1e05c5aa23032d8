//! # Connectivity Supervision
//!
//! Wraps the external network-link capability behind [`LinkProbe`] and owns
//! the [`LinkState`] everyone else reads. The supervisor never escalates:
//! when the link is down it issues one bounded reconnect attempt per tick
//! (associate, bounded wait, re-check) and reports the result. Repeated
//! down-ticks repeat the same bounded attempt; there is deliberately no
//! backoff state between ticks.
//!
//! On a host target, interface association belongs to the operating system.
//! The shipped probe ([`TcpProbe`]) observes reachability of the
//! collector's socket with a bounded TCP connect; `associate()` is the hook
//! where an interface kick would go and is a no-op for TCP.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::LinkState;

/// The external link capability: observe state, kick the interface.
pub trait LinkProbe {
    /// Is the link currently usable?
    fn check(&mut self) -> bool;

    /// Ask the underlying interface to (re)associate. Best effort; the
    /// result is observed through the next `check`.
    fn associate(&mut self);
}

/// Probe that treats "the collector's socket accepts a TCP connection
/// within the bound" as link-up.
pub struct TcpProbe {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpProbe {
    /// Resolve `host:port` once at startup. Resolution failure is a wiring
    /// error, reported to the caller rather than retried here.
    pub fn new(target: &str, timeout: Duration) -> std::io::Result<Self> {
        let addr = target
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::other(format!("no address for {target}")))?;
        Ok(TcpProbe { addr, timeout })
    }
}

impl LinkProbe for TcpProbe {
    fn check(&mut self) -> bool {
        match TcpStream::connect_timeout(&self.addr, self.timeout) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("link probe to {} failed: {}", self.addr, e);
                false
            }
        }
    }

    fn associate(&mut self) {
        // Association is the host OS's job; nothing to kick for TCP.
    }
}

/// Owns the link state; its probe refresh is the only mutation path.
pub struct ConnectivitySupervisor<P: LinkProbe> {
    probe: P,
    state: LinkState,
}

impl<P: LinkProbe> ConnectivitySupervisor<P> {
    /// Start pessimistic: the state is Disconnected until a probe says
    /// otherwise.
    pub fn new(probe: P) -> Self {
        ConnectivitySupervisor {
            probe,
            state: LinkState::Disconnected,
        }
    }

    /// Last observed state, without touching the probe.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Refresh the state from the probe and report whether the link is up.
    pub fn is_up(&mut self) -> bool {
        let up = self.probe.check();
        let next = if up {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        };
        if next != self.state {
            log::info!("link state: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        up
    }

    /// One bounded reconnect attempt: kick the interface, wait out the
    /// bound, re-check. The result is reported, not thrown.
    pub async fn attempt_reconnect(&mut self, wait: Duration) -> bool {
        log::info!("link down, attempting reconnect");
        self.probe.associate();
        tokio::time::sleep(wait).await;
        let up = self.is_up();
        if up {
            log::info!("link restored");
        } else {
            log::warn!("reconnect attempt failed");
        }
        up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Probe that answers from a script, then stays on the last answer.
    struct ScriptedProbe {
        answers: Vec<bool>,
        cursor: usize,
        associate_calls: u32,
    }

    impl ScriptedProbe {
        fn new(answers: Vec<bool>) -> Self {
            ScriptedProbe {
                answers,
                cursor: 0,
                associate_calls: 0,
            }
        }
    }

    impl LinkProbe for ScriptedProbe {
        fn check(&mut self) -> bool {
            let answer = self.answers[self.cursor.min(self.answers.len() - 1)];
            self.cursor += 1;
            answer
        }

        fn associate(&mut self) {
            self.associate_calls += 1;
        }
    }

    #[test]
    fn starts_disconnected_until_probed() {
        let supervisor = ConnectivitySupervisor::new(ScriptedProbe::new(vec![true]));
        assert_eq!(supervisor.state(), LinkState::Disconnected);
    }

    #[test]
    fn probe_refresh_is_the_only_mutation_path() {
        let mut supervisor = ConnectivitySupervisor::new(ScriptedProbe::new(vec![true, false]));
        assert!(supervisor.is_up());
        assert_eq!(supervisor.state(), LinkState::Connected);
        assert!(!supervisor.is_up());
        assert_eq!(supervisor.state(), LinkState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_kicks_the_interface_and_rechecks() {
        let mut supervisor =
            ConnectivitySupervisor::new(ScriptedProbe::new(vec![false, true]));
        assert!(!supervisor.is_up());

        let restored = supervisor.attempt_reconnect(Duration::from_secs(2)).await;
        assert!(restored);
        assert_eq!(supervisor.state(), LinkState::Connected);
        assert_eq!(supervisor.probe.associate_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reconnect_reports_rather_than_throws() {
        let mut supervisor = ConnectivitySupervisor::new(ScriptedProbe::new(vec![false]));
        let restored = supervisor.attempt_reconnect(Duration::from_secs(2)).await;
        assert!(!restored);
        assert_eq!(supervisor.state(), LinkState::Disconnected);
    }
}
