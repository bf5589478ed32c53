//! Response types for the relay API.

use serde::Serialize;

/// Body returned by the submission endpoint.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub message: &'static str,
}

impl RelayResponse {
    pub fn processed() -> Self {
        Self {
            message: "Form submission processed",
        }
    }

    pub fn failed() -> Self {
        Self {
            message: "Error processing form submission",
        }
    }

    pub fn rejected() -> Self {
        Self {
            message: "Invalid form submission",
        }
    }
}

/// Response from the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub downstream: String,
    pub uptime_secs: u64,
    pub submissions: SubmissionStats,
}

#[derive(Debug, Serialize)]
pub struct SubmissionStats {
    pub received: u64,
    pub forwarded: u64,
    pub failed: u64,
    pub rejected: u64,
}
