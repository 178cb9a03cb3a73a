//! HTTP transport used by the prober
//!
//! The prober only needs one operation from the network: "GET this URL within
//! this timeout and tell me the final status code". [`Transport`] is that seam,
//! so checks can be exercised without a network in tests.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Transport-level failure, before any response status is known
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Issues a single GET and reports the final status code
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, following redirects, bounded by `timeout`
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// Builds an HTTP client that identifies itself and follows redirects
///
/// # Example
///
/// ```no_run
/// use linkwatch::config::UserAgentConfig;
/// use linkwatch::probe::build_http_client;
///
/// let config = UserAgentConfig {
///     client_name: "Linkwatch".to_string(),
///     client_version: "1.0".to_string(),
///     contact_url: None,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a client built from the user agent config
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        Ok(response.status().as_u16())
    }
}

/// Sorts a reqwest error into timeout, connection failure, or anything else
fn classify_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
