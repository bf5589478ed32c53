//! # Form Relay
//!
//! Forwards website form submissions to a downstream processing endpoint.
//! Each submission is reshaped into a [`SubmissionEnvelope`] and POSTed once;
//! the downstream outcome is mapped to a generic caller-facing message.
//!
//! ## Quick Start
//! ```bash
//! RELAY_DOWNSTREAM_BASE_URL=https://example.org cargo run --bin form-relay
//! ```
//!
//! ## Endpoints
//! - `POST /submit-form` - Relay a form submission downstream
//! - `GET /health` - Health check with counters
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod downstream;
pub mod envelope;
mod error;
mod handlers;
pub mod metrics;
pub mod middleware;
mod response;
mod router;
mod state;

pub use config::Config;
pub use downstream::DownstreamClient;
pub use envelope::SubmissionEnvelope;
pub use error::Error;
pub use response::{HealthResponse, RelayResponse, SubmissionStats};
pub use router::create as create_router;
pub use state::AppState;
