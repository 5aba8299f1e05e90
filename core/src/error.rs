//! Error types for the business-unit client and reconciler.
//!
//! # Design
//! Every `TransportError` variant carries the method and endpoint it failed
//! on, plus the status code when the server answered, so a failure can be
//! reported upstream without reproducing it. Transport and validation errors
//! are `Clone + Serialize` because they end up inside `SyncOutcome`s that
//! hosts receive as JSON.

use serde::Serialize;
use thiserror::Error;

use crate::http::HttpMethod;
use crate::types::UnitId;

/// Failure of a single HTTP operation against the remote collection.
#[derive(Debug, Clone, Error, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("{method} {endpoint} returned HTTP {status}: {body}")]
    Status {
        method: HttpMethod,
        endpoint: String,
        status: u16,
        body: String,
    },

    /// No response was received (connect failure, timeout, reset).
    #[error("{method} {endpoint} failed: {message}")]
    Network {
        method: HttpMethod,
        endpoint: String,
        message: String,
        timed_out: bool,
    },

    /// A 2xx response body could not be decoded into the expected type.
    #[error("could not decode response from {method} {endpoint}: {message}")]
    Decode {
        method: HttpMethod,
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("could not encode request for {method} {endpoint}: {message}")]
    Encode {
        method: HttpMethod,
        endpoint: String,
        message: String,
    },
}

impl TransportError {
    pub fn method(&self) -> HttpMethod {
        match self {
            TransportError::Status { method, .. }
            | TransportError::Network { method, .. }
            | TransportError::Decode { method, .. }
            | TransportError::Encode { method, .. } => *method,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            TransportError::Status { endpoint, .. }
            | TransportError::Network { endpoint, .. }
            | TransportError::Decode { endpoint, .. }
            | TransportError::Encode { endpoint, .. } => endpoint,
        }
    }

    /// HTTP status of the response, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } | TransportError::Decode { status, .. } => {
                Some(*status)
            }
            TransportError::Network { .. } | TransportError::Encode { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Network { timed_out: true, .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// A record rejected by the validator before any network call.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("record at index {index} (id {id}) is invalid: {}", .errors.join("; "))]
pub struct ValidationError {
    pub index: usize,
    pub id: UnitId,
    pub errors: Vec<String>,
}

/// Fatal errors for a whole reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote snapshot could not be fetched; no record was attempted.
    #[error("could not fetch remote snapshot: {0}")]
    Snapshot(#[source] TransportError),

    /// A record failed pre-flight validation; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Invalid client or sync configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("could not build HTTP client: {0}")]
    HttpClient(String),

    #[error("could not start async runtime: {0}")]
    Runtime(String),
}
