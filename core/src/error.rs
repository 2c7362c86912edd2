//! Error types for the myFlix client.
//!
//! # Design
//! Every non-2xx status and every transport failure collapses into
//! `ApiError::RequestFailed`. The status and body are logged where the
//! failure is detected but are not carried in the value, so callers can only
//! show the message and let the user retry.

use thiserror::Error;

/// Errors returned by `MovieClient` parse methods and the `MovieApi` facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Non-success status or transport failure.
    #[error("Something bad happened; please try again later.")]
    RequestFailed,

    /// The session has no token or no current user; no request was issued.
    #[error("Authentication token or user is missing.")]
    MissingSession,

    /// A 2xx response body did not match the expected entity.
    #[error("invalid response payload: {0}")]
    InvalidPayload(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The local session store could not be written.
    #[error("session storage failed: {0}")]
    Storage(String),
}

/// Errors from a `KeyValueStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not a JSON object: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("session could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

/// Errors raised while executing an `HttpRequest`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("transport task failed: {0}")]
    Join(String),
}
