//! Application state shared across handlers.

use crate::config::Config;
use crate::downstream::DownstreamClient;
use crate::metrics::Metrics;
use std::time::Instant;

/// Shared application state.
///
/// Metrics are observational only; no relay decision reads them.
pub struct AppState {
    pub config: Config,
    pub downstream: DownstreamClient,
    pub metrics: Metrics,
    pub start_time: Instant,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        config.validate()?;

        Ok(Self {
            downstream: DownstreamClient::new(&config.downstream_base_url),
            config,
            metrics: Metrics::new(),
            start_time: Instant::now(),
        })
    }
}
