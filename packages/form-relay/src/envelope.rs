//! Canonical envelope forwarded downstream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Inbound field naming the submitted form.
pub const FORM_NAME_FIELD: &str = "formName";

/// A form submission reshaped for the downstream processor.
///
/// Serializes as `{"form_name", "payload", "created_at"}` in that order, with
/// `created_at` in RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    pub form_name: String,
    pub payload: Map<String, Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SubmissionEnvelope {
    /// Build an envelope stamped with the current UTC time.
    pub fn from_submission(body: Value) -> Result<Self, crate::Error> {
        Self::from_submission_at(body, OffsetDateTime::now_utc())
    }

    /// Build an envelope with an explicit timestamp.
    ///
    /// Every field except `formName` is carried into `payload` untouched.
    pub fn from_submission_at(
        body: Value,
        created_at: OffsetDateTime,
    ) -> Result<Self, crate::Error> {
        let mut fields = match body {
            Value::Object(fields) => fields,
            other => {
                return Err(crate::Error::InvalidSubmission(format!(
                    "expected a JSON object, got {}",
                    kind(&other)
                )))
            }
        };

        let form_name = match fields.shift_remove(FORM_NAME_FIELD) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(crate::Error::InvalidSubmission(format!(
                    "{FORM_NAME_FIELD} must be a string, got {}",
                    kind(&other)
                )))
            }
            None => {
                return Err(crate::Error::InvalidSubmission(format!(
                    "missing {FORM_NAME_FIELD}"
                )))
            }
        };

        Ok(Self {
            form_name,
            payload: fields,
            created_at,
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
