//! Network transport for submissions.
//!
//! One logical POST of the JSON payload to the intake endpoint. The trait
//! seam exists so the retry policy and controller are testable without a
//! listening server.

use std::time::Duration;

use asupersync::http::h1::HttpClient;
use asupersync::http::h1::Method;
use asupersync::runtime::RuntimeBuilder;
use asupersync::time::{timeout, wall_now};
use contact_relay_core::error::{Error, Result};
use contact_relay_core::models::{SubmissionOutcome, SubmissionRequest};

/// Hard cap on one network attempt; backoff and retries live above this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Posts one submission payload and parses the outcome.
pub trait Transport: Send + Sync {
    fn post(&self, payload: &SubmissionRequest) -> Result<SubmissionOutcome>;
}

/// HTTP transport against the configured intake endpoint.
pub struct HttpTransport {
    endpoint: String,
}

impl HttpTransport {
    #[must_use]
    pub const fn new(endpoint: String) -> Self {
        Self { endpoint }
    }
}

impl Transport for HttpTransport {
    fn post(&self, payload: &SubmissionRequest) -> Result<SubmissionOutcome> {
        let body = serde_json::to_vec(payload)?;
        let url = self.endpoint.clone();

        let runtime = RuntimeBuilder::new()
            .worker_threads(1)
            .build()
            .map_err(|e| Error::Transport(format!("runtime: {e}")))?;

        runtime.block_on(async move {
            let client = HttpClient::new();
            let headers = vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
            ];

            let fut = Box::pin(client.request(Method::Post, &url, headers, body));
            let response = match timeout(wall_now(), REQUEST_TIMEOUT, fut).await {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) => return Err(Error::Transport(e.to_string())),
                Err(_) => return Err(Error::Transport("request timed out".to_string())),
            };

            // Failure outcomes still arrive as JSON bodies; a body that does
            // not parse means the transport itself is broken.
            let outcome: SubmissionOutcome = serde_json::from_slice(&response.body)
                .map_err(|e| Error::Transport(format!("unparseable response: {e}")))?;
            Ok(outcome)
        })
    }
}
