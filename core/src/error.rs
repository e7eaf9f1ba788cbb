//! Error types for the storage API client.
//!
//! # Design
//! API-level failures (any response with status >= 400) are *not* errors
//! here: they come back as an `ApiResponse` the caller branches on with
//! `is_error()`. The enums below cover what cannot be expressed as a
//! response: the request never produced a status, the client could not be
//! constructed, or the caller asked for error details on a successful
//! response.

use thiserror::Error;

/// The transport could not produce an HTTP status for a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or protocol failure before a status was received.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// A status was received but the body could not be read to completion.
    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// Errors returned by `ApiClient` and `ApiResponse`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No default transport was compiled in (the `ureq` feature is off) and
    /// none was supplied through `ApiClient::with_transport`.
    #[error("no HTTP transport available; enable the `ureq` feature or supply a transport")]
    TransportUnavailable,

    /// `error_details()` was called on a response that is not an error.
    #[error("request was successful (HTTP {status}), there are no error details")]
    NoErrorDetails { status: u16 },

    /// A JSON request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
