//! Client for the downstream submission processor.
//!
//! One POST per envelope. No retries and no timeout beyond `reqwest`'s
//! defaults; any transport error or non-2xx status is a
//! [`crate::Error::Downstream`]. The outcome is decided on the status line;
//! a failing response's body is only sampled for logs, bounded in size and time.

use crate::envelope::SubmissionEnvelope;
use std::time::Duration;
use tracing::{debug, info};

/// Fixed path appended to the configured base URL.
pub const DOWNSTREAM_PATH: &str = "/api/form-submissions";

/// Longest downstream error body kept for logs.
const ERROR_BODY_EXCERPT: usize = 512;

/// How long a failing response's body may take to yield its excerpt.
const ERROR_BODY_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// HTTP client bound to a single downstream endpoint.
pub struct DownstreamClient {
    http: reqwest::Client,
    endpoint: String,
}

impl DownstreamClient {
    pub fn new(base_url: &str) -> Self {
        let endpoint = endpoint_for(base_url);
        info!(endpoint = %endpoint, "Downstream client initialized");
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// The full URL envelopes are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward an envelope. `Ok` only when downstream answers 2xx.
    pub async fn forward(&self, envelope: &SubmissionEnvelope) -> Result<(), crate::Error> {
        // `.json()` sets `Content-Type: application/json`.
        let response = self
            .http
            .post(&self.endpoint)
            .json(envelope)
            .send()
            .await
            .map_err(|e| {
                crate::Error::Downstream(format!("request to {} failed: {e}", self.endpoint))
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), form = %envelope.form_name, "Downstream accepted");
            return Ok(());
        }

        let body = read_excerpt(response).await;
        Err(crate::Error::Downstream(format!(
            "status {}: {}",
            status.as_u16(),
            excerpt(&body)
        )))
    }
}

/// Read at most [`ERROR_BODY_EXCERPT`] bytes, giving up after
/// [`ERROR_BODY_READ_TIMEOUT`]. The rest of the body is dropped with the response.
async fn read_excerpt(mut response: reqwest::Response) -> String {
    let mut buf = Vec::new();
    let read = async {
        while buf.len() < ERROR_BODY_EXCERPT {
            match response.chunk().await {
                Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
                _ => break,
            }
        }
    };
    if tokio::time::timeout(ERROR_BODY_READ_TIMEOUT, read).await.is_err() {
        debug!(read = buf.len(), "Downstream error body stalled, logging partial excerpt");
    }
    buf.truncate(ERROR_BODY_EXCERPT);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Join the base URL and [`DOWNSTREAM_PATH`], dropping a trailing `/` on the base.
pub fn endpoint_for(base_url: &str) -> String {
    format!("{}{DOWNSTREAM_PATH}", base_url.trim().trim_end_matches('/'))
}

fn excerpt(body: &str) -> &str {
    if body.len() <= ERROR_BODY_EXCERPT {
        return body;
    }
    let mut end = ERROR_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
