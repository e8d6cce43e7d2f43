//! Error types for the beer catalog API client.
//!
//! # Design
//! Every client, service and catalog operation reports exactly one
//! `ApiError`. A 404 is not special-cased: any status that fails the
//! operation's success criterion lands in `Server` with the raw status code
//! and body.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The base URL or API key cannot produce a valid request. Nothing was sent.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response (DNS, refused connection, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status the operation does not accept.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The body was present but did not match the expected shape.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The operation needs a response body and none came back.
    #[error("response body missing")]
    MissingData,

    /// The request payload could not be serialized to JSON.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The payload was rejected before a request was built.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// HTTP status carried by a `Server` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
