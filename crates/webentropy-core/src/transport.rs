//! Timeout-bound HTTP transport seam.
//!
//! The fetch layer talks to the network through the [`Transport`] trait so
//! the orchestrator and the tiered fallback can be exercised with an
//! in-memory transport in tests. [`HttpTransport`] is the production
//! implementation, one fresh instance (and connection state) per invocation.

use std::time::Duration;

use async_trait::async_trait;

/// Classified transport-level failure. Covers everything below the HTTP
/// status line: DNS, connect, TLS, and the timeout budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not produce a terminal outcome within the budget.
    TimedOut(Duration),
    /// Any other transport failure, with the underlying message.
    Failed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut(budget) => write!(f, "timed out after {} ms", budget.as_millis()),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// A received HTTP response: status line plus the fully read body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One timeout-bound GET. Implementations read the body to completion; a
/// body cut short by the timeout is a [`TransportError::TimedOut`], never a
/// truncated success.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose requests (including body reads) share one
    /// timeout budget.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webentropy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Failed(format!("http client init failed: {e}")))?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::TimedOut(self.timeout)
        } else {
            // Strip the URL so diagnostics stay stable across tier params.
            TransportError::Failed(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(TransportResponse { status, body })
    }
}
