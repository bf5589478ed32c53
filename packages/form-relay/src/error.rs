//! Error types for the relay.

use crate::response::RelayResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Relay error type.
///
/// `Display` carries the internal detail for logs; responses only ever carry
/// the generic [`RelayResponse`] messages.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Inbound body is not a JSON object with a string `formName`.
    InvalidSubmission(String),
    /// Downstream rejected the envelope or could not be reached.
    Downstream(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::InvalidSubmission(msg) => write!(f, "invalid submission: {msg}"),
            Error::Downstream(msg) => write!(f, "downstream submission failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = match &self {
            Error::InvalidSubmission(_) => RelayResponse::rejected(),
            Error::Config(_) | Error::Downstream(_) => RelayResponse::failed(),
        };
        (self.status(), Json(body)).into_response()
    }
}
