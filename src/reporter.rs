//! # Telemetry Reporting
//!
//! This module carries one reading to the remote collector: it builds the
//! wire payload, performs a single bounded HTTP POST, classifies the result
//! into [`DeliveryOutcome`], and accounts it in the running statistics.
//!
//! ## Wire Format
//!
//! One JSON object per POST, content-type application/json:
//!
//! ```json
//! {"humidity": 62.5, "temperature": 47.5, "alert": "", "group_id": 1}
//! ```
//!
//! Values are rounded to one decimal before serialization. The alert field
//! is the human-readable flag text ([`AlertFlags::text`]), empty when no
//! threshold is exceeded. The payload is a serialized record rather than
//! spliced strings, so quoting and escaping are serde_json's problem.
//!
//! ## Outcome Classification
//!
//! The collector's acknowledgement is not validated: any HTTP response,
//! whatever its status class, counts as [`DeliveryOutcome::Success`]. Only
//! transport-level failures count against the success rate, mapped onto a
//! fixed taxonomy ([`TransportError`]) whose numeric codes match the
//! firmware-style table: -1 connection failed, -2 send failed, -3
//! connection lost, -4 no response, -11 timeout, anything else negative is
//! carried verbatim.
//!
//! ## Retry Policy
//!
//! None here. One attempt per invocation; the retry cadence is the main
//! loop's next tick.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::stats::StatsTracker;
use crate::{AlertFlags, Reading};

/// A transport-level delivery failure.
///
/// Variants mirror the fixed error table of the collector link; each knows
/// its numeric code and renders the fixed description through `Display`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// TCP/TLS connection could not be established (-1)
    #[error("connection failed")]
    ConnectionFailed,

    /// Request could not be written to the established connection (-2)
    #[error("send failed")]
    SendFailed,

    /// Connection dropped mid-exchange (-3)
    #[error("connection lost")]
    ConnectionLost,

    /// Collector accepted the request but no response arrived (-4)
    #[error("no response")]
    NoResponse,

    /// The bounded request window elapsed (-11)
    #[error("timeout")]
    Timeout,

    /// Any other negative link code, carried verbatim
    #[error("transport error {0}")]
    Other(i32),
}

impl TransportError {
    /// Map a negative link code onto the taxonomy.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => TransportError::ConnectionFailed,
            -2 => TransportError::SendFailed,
            -3 => TransportError::ConnectionLost,
            -4 => TransportError::NoResponse,
            -11 => TransportError::Timeout,
            other => TransportError::Other(other),
        }
    }

    /// Numeric code of this variant.
    pub fn code(&self) -> i32 {
        match self {
            TransportError::ConnectionFailed => -1,
            TransportError::SendFailed => -2,
            TransportError::ConnectionLost => -3,
            TransportError::NoResponse => -4,
            TransportError::Timeout => -11,
            TransportError::Other(code) => *code,
        }
    }
}

/// Classified result of one send attempt. Produced fresh per attempt and
/// consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The collector responded; the status value is reported, not judged.
    Success { status: u16, body: String },
    /// The attempt failed below the HTTP layer.
    Failed(TransportError),
}

/// Classify a raw link result code the way the collector link reports it:
/// non-negative is a response status (success regardless of value),
/// negative selects a [`TransportError`] variant.
pub fn classify(code: i32, body: String) -> DeliveryOutcome {
    if code >= 0 {
        DeliveryOutcome::Success {
            status: code as u16,
            body,
        }
    } else {
        DeliveryOutcome::Failed(TransportError::from_code(code))
    }
}

/// One telemetry POST body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub humidity: f32,
    pub temperature: f32,
    pub alert: String,
    pub group_id: i64,
}

impl TelemetryPayload {
    pub fn new(reading: &Reading, alerts: AlertFlags, group_id: i64) -> Self {
        TelemetryPayload {
            humidity: round_1dp(reading.humidity),
            temperature: round_1dp(reading.temperature),
            alert: alerts.text(),
            group_id,
        }
    }
}

fn round_1dp(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// The POST capability. Production uses [`HttpTransport`]; tests script
/// outcomes directly.
pub trait Transport {
    fn dispatch(
        &self,
        payload: &TelemetryPayload,
    ) -> impl std::future::Future<Output = DeliveryOutcome>;
}

/// reqwest-backed transport against a single fixed endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

/// Failures wiring up the transport at startup.
#[derive(Debug, Error)]
pub enum TransportSetupError {
    #[error("invalid collector endpoint: {0}")]
    Endpoint(String),

    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl HttpTransport {
    /// Build a client bounded by `timeout` for every request against
    /// `endpoint`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportSetupError> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| TransportSetupError::Endpoint(e.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client, endpoint })
    }
}

impl Transport for HttpTransport {
    async fn dispatch(&self, payload: &TelemetryPayload) -> DeliveryOutcome {
        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return DeliveryOutcome::Failed(classify_request_error(&e)),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => DeliveryOutcome::Success { status, body },
            Err(e) if e.is_timeout() => DeliveryOutcome::Failed(TransportError::Timeout),
            Err(_) => DeliveryOutcome::Failed(TransportError::NoResponse),
        }
    }
}

/// Map a reqwest request error onto the fixed taxonomy.
fn classify_request_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::ConnectionFailed
    } else if error.is_body() || error.is_request() {
        TransportError::SendFailed
    } else {
        TransportError::ConnectionLost
    }
}

/// Builds the payload, dispatches it, classifies the outcome, and records
/// it. The caller is responsible for checking link state first; this
/// component does not verify connectivity.
pub struct TelemetryReporter<T: Transport> {
    transport: T,
    group_id: i64,
}

impl<T: Transport> TelemetryReporter<T> {
    pub fn new(transport: T, group_id: i64) -> Self {
        TelemetryReporter {
            transport,
            group_id,
        }
    }

    /// One attempt: always advances `attempts`, and exactly one of
    /// successes/failures, via [`StatsTracker::record`].
    pub async fn send(
        &self,
        reading: &Reading,
        alerts: AlertFlags,
        stats: &mut StatsTracker,
    ) -> DeliveryOutcome {
        let payload = TelemetryPayload::new(reading, alerts, self.group_id);
        log::debug!(
            "payload built: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );

        let outcome = self.transport.dispatch(&payload).await;
        match &outcome {
            DeliveryOutcome::Success { status, body } => {
                log::info!("collector replied {} ({} byte body)", status, body.len());
            }
            DeliveryOutcome::Failed(error) => {
                log::warn!("send failed: {} (code {})", error, error.code());
            }
        }

        stats.record(&outcome);
        outcome
    }
}
