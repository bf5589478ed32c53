//! HTTP request handlers.

use crate::envelope::SubmissionEnvelope;
use crate::middleware::RequestId;
use crate::response::{HealthResponse, RelayResponse};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{FromRequest, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Health check with submission counters.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        downstream: state.downstream.endpoint().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        submissions: state.metrics.submissions(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        state.metrics.render(),
    )
}

/// Relay a form submission to the downstream processor.
///
/// The body is parsed as JSON whatever the declared content type.
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    request: axum::extract::Request,
) -> Response {
    let metrics = &state.metrics;
    metrics.submissions_total.fetch_add(1, Ordering::Relaxed);

    // Extract correlation ID (set by middleware).
    let req_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();

    let envelope = match read_body(request, &state)
        .await
        .and_then(SubmissionEnvelope::from_submission)
    {
        Ok(envelope) => envelope,
        Err(e) => {
            metrics.submissions_rejected.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, error = %e, "Rejected form submission");
            return e.into_response();
        }
    };

    info!(
        req_id = %req_id,
        form = %envelope.form_name,
        fields = envelope.payload.len(),
        "Relaying form submission"
    );

    let start = std::time::Instant::now();
    let result = state.downstream.forward(&envelope).await;
    metrics.record_forward_duration(start);

    match result {
        Ok(()) => {
            metrics.submissions_forwarded.fetch_add(1, Ordering::Relaxed);
            info!(req_id = %req_id, form = %envelope.form_name, "Form submission forwarded");
            (StatusCode::OK, Json(RelayResponse::processed())).into_response()
        }
        Err(e) => {
            metrics.submissions_failed.fetch_add(1, Ordering::Relaxed);
            error!(
                req_id = %req_id,
                form = %envelope.form_name,
                error = %e,
                "Form submission failed"
            );
            e.into_response()
        }
    }
}

async fn read_body(
    request: axum::extract::Request,
    state: &Arc<AppState>,
) -> Result<Value, crate::Error> {
    let bytes = Bytes::from_request(request, state)
        .await
        .map_err(|e| crate::Error::InvalidSubmission(format!("unreadable body: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| crate::Error::InvalidSubmission(format!("invalid JSON body: {e}")))
}
