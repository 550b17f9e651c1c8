//! Failure taxonomy for every outbound call.
//!
//! ERROR HANDLING
//! ==============
//! Raw transport failures (`TransportFailure`) never leave the `net` module:
//! `normalize` collapses them into the three `NormalizedError` kinds that pages
//! render. The mapping is total and depends only on the failure's shape.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::collections::BTreeMap;

pub const GENERIC_REJECTION_MESSAGE: &str = "An error occurred";
pub const UNREACHABLE_MESSAGE: &str = "No response from server. Please check your connection.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Failure as reported by the underlying HTTP client, before normalization.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    /// The service answered with an error status.
    #[error("server responded with status {status}")]
    Response { status: u16, body: String },
    /// The request was dispatched but no response arrived.
    #[error("no response: {0}")]
    NoResponse(String),
    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),
}

/// The only failure shape callers of the auth layer ever observe.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NormalizedError {
    /// The service explicitly rejected the request.
    #[error("{message}")]
    RemoteRejection { message: String, status: u16, field_errors: Option<BTreeMap<String, String>> },
    /// Request sent, no response.
    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable,
    /// Request could not be constructed or sent, or the answer was unusable.
    /// `invalid_input` marks local validation failures whose message is meant for the user.
    #[error("{message}")]
    Malformed { message: String, invalid_input: bool },
}

impl NormalizedError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into(), invalid_input: false }
    }

    /// Rejected before sending because the caller's input is incomplete.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into(), invalid_input: true }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::RemoteRejection { field_errors, .. } => field_errors.as_ref(),
            _ => None,
        }
    }

    /// Text a form should show for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RemoteRejection { message, .. } => message.clone(),
            Self::Unreachable => UNREACHABLE_MESSAGE.to_owned(),
            Self::Malformed { message, invalid_input: true } => message.clone(),
            Self::Malformed { .. } => UNEXPECTED_MESSAGE.to_owned(),
        }
    }
}

/// Map a transport failure to its taxonomy member.
#[must_use]
pub fn normalize(failure: TransportFailure) -> NormalizedError {
    match failure {
        TransportFailure::Response { status, body } => {
            let (message, field_errors) = parse_rejection_body(&body);
            NormalizedError::RemoteRejection {
                message: message.unwrap_or_else(|| GENERIC_REJECTION_MESSAGE.to_owned()),
                status,
                field_errors,
            }
        }
        TransportFailure::NoResponse(_) => NormalizedError::Unreachable,
        TransportFailure::Request(reason) => {
            let reason = reason.trim();
            NormalizedError::malformed(if reason.is_empty() { UNEXPECTED_MESSAGE } else { reason })
        }
    }
}

type RejectionDetails = (Option<String>, Option<BTreeMap<String, String>>);

/// Extract a message and per-field errors from an error body.
///
/// Accepted shapes: `{message, errors?}`, a flat `{field: message}` validation
/// map, a bare JSON string, or plain text.
fn parse_rejection_body(body: &str) -> RejectionDetails {
    let body = body.trim();
    if body.is_empty() {
        return (None, None);
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (Some(body.to_owned()), None);
    };
    match value {
        serde_json::Value::Object(map) => {
            let message = non_empty_str(map.get("message")).or_else(|| non_empty_str(map.get("error")));
            let field_errors = match map.get("errors") {
                Some(serde_json::Value::Object(errors)) => Some(stringify_values(errors)),
                Some(_) => None,
                None if message.is_none() && !map.is_empty() && map.values().all(serde_json::Value::is_string) => {
                    Some(stringify_values(&map))
                }
                None => None,
            };
            (message, field_errors.filter(|m| !m.is_empty()))
        }
        serde_json::Value::String(s) if !s.trim().is_empty() => (Some(s.trim().to_owned()), None),
        _ => (None, None),
    }
}

fn non_empty_str(value: Option<&serde_json::Value>) -> Option<String> {
    value
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn stringify_values(map: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(k, v)| {
            let text = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}
