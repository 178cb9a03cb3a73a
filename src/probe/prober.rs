use crate::config::Config;
use crate::probe::classify::{classify_status, FailureKind};
use crate::probe::transport::{ReqwestTransport, Transport, TransportError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timeout applied when none is configured
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// True for a response with status in [200, 400)
    pub is_up: bool,

    /// Final response status, absent when no response arrived
    pub status_code: Option<u16>,

    /// Wall-clock seconds from the start of the attempt to response or failure
    pub latency_secs: f64,

    /// Why the probe counted as down
    pub failure: Option<FailureKind>,
}

impl ProbeResult {
    /// Builds the result for a response with the given status
    pub fn from_status(status_code: u16, latency: Duration) -> Self {
        let failure = classify_status(status_code);
        Self {
            is_up: failure.is_none(),
            status_code: Some(status_code),
            latency_secs: latency.as_secs_f64(),
            failure,
        }
    }

    /// Builds the result for a transport failure
    pub fn from_transport_error(error: TransportError, latency: Duration) -> Self {
        let failure = match error {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::Connect(_) => FailureKind::Connection,
            TransportError::Other(message) => FailureKind::Transport(message),
        };

        Self {
            is_up: false,
            status_code: None,
            latency_secs: latency.as_secs_f64(),
            failure: Some(failure),
        }
    }

    /// Short error message recorded in history (`"HTTP 503"`, `"Connection Timeout"`)
    pub fn error_message(&self) -> Option<String> {
        self.failure.as_ref().map(FailureKind::message)
    }
}

/// Executes single URL checks
///
/// The prober never touches storage; its only side effect is the network
/// request, and every failure comes back as a [`ProbeResult`].
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Prober {
    /// Creates a prober over the given transport
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Creates a reqwest-backed prober from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::new(
            Arc::new(transport),
            Duration::from_secs(config.monitor.probe_timeout_secs),
        ))
    }

    /// Checks `url` once
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();
        let outcome = self.transport.get(url, self.timeout).await;
        let latency = start.elapsed();

        let result = match outcome {
            Ok(status_code) => ProbeResult::from_status(status_code, latency),
            Err(error) => ProbeResult::from_transport_error(error, latency),
        };

        tracing::debug!(
            "Probed {}: up={} status={:?} in {:.3}s",
            url,
            result.is_up,
            result.status_code,
            result.latency_secs
        );

        result
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
