//! Prober: executes a single URL check and classifies the outcome
//!
//! This module contains:
//! - The [`Transport`] seam and its reqwest implementation
//! - Status and transport-failure classification into [`FailureKind`]
//! - The human-readable error-detail mapping used by alerts

mod classify;
mod prober;
mod transport;

pub use classify::{
    classify_status, error_detail, is_up_status, FailureKind, CONNECTION_MESSAGE, TIMEOUT_MESSAGE,
};
pub use prober::{ProbeResult, Prober, DEFAULT_PROBE_TIMEOUT};
pub use transport::{build_http_client, ReqwestTransport, Transport, TransportError};
