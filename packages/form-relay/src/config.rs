//! Relay configuration.

use serde::Deserialize;

/// Configuration for the form relay.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the downstream processor. The fixed submission path is
    /// appended to it.
    #[serde(default = "defaults::downstream_base_url")]
    pub downstream_base_url: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// `*` or a comma-separated list of exact origins.
    #[serde(default = "defaults::allowed_origins")]
    pub allowed_origins: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            downstream_base_url: defaults::downstream_base_url(),
            bind_address: defaults::bind_address(),
            allowed_origins: defaults::allowed_origins(),
        }
    }
}

impl Config {
    /// Load from an optional `relay.toml` overridden by `RELAY_*` env vars.
    ///
    /// Every field has a default, so a missing file is fine; malformed files
    /// or values are errors.
    pub fn load() -> Result<Self, crate::Error> {
        Self::from_builder(
            ::config::Config::builder()
                .add_source(::config::File::with_name("relay").required(false))
                .add_source(::config::Environment::with_prefix("RELAY")),
        )
    }

    fn from_builder(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self, crate::Error> {
        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| crate::Error::Config(format!("failed to load configuration: {e}")))
    }

    /// Reject configurations the relay cannot forward with.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let base = self.downstream_base_url.trim();
        if base.is_empty() {
            return Err(crate::Error::Config(
                "downstream_base_url must not be empty".into(),
            ));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(crate::Error::Config(format!(
                "downstream_base_url must be an http(s) URL, got {base}"
            )));
        }
        Ok(())
    }

    /// Parsed origin allow-list. `None` means any origin.
    pub fn origins(&self) -> Option<Vec<String>> {
        let raw = self.allowed_origins.trim();
        if raw.is_empty() || raw == "*" {
            return None;
        }
        Some(
            raw.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        )
    }
}

mod defaults {
    pub fn downstream_base_url() -> String {
        // Priority: RELAY_DOWNSTREAM_BASE_URL (via config source) > URL > local dev server
        if let Ok(url) = std::env::var("URL") {
            if !url.is_empty() {
                return url;
            }
        }
        "http://localhost:8888".into()
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn allowed_origins() -> String {
        "*".into()
    }
}
