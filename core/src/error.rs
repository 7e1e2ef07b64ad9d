//! Error types for the portal request client.
//!
//! # Design
//! A failed call is either an `Http` error (the server answered with a
//! non-2xx status) or a `Transport` error (no answer at all, so no status).
//! An unparsable response body is not an error: it reads as JSON `null`.
//! The two remaining variants cover typed bodies on either side of the wire.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `RequestClient` and `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned a status outside 200–299.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        /// Parsed response body, if it was valid JSON.
        payload: Option<Value>,
    },

    /// The request never completed: connection refused, DNS, timeout, ...
    #[error("{message}")]
    Transport { message: String },

    /// A typed request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response JSON did not match the type the caller asked for.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// HTTP status, absent for everything but `Http`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Http { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } | ApiError::Transport { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}
