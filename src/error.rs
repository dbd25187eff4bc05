//! Error types shared by the proxy clients

use thiserror::Error;

/// Failure raised by an [`HttpTransport`](crate::proxy::HttpTransport)
/// before a response was received.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Io(String),
}

/// Errors returned by the proxy clients
#[derive(Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The provider answered with something other than a JSON object
    #[error("unexpected provider response: {0}")]
    ProviderResponse(String),

    /// The provider reported an error, usually an exhausted quota
    #[error("provider rejected the request: {0}")]
    QuotaOrQuery(String),

    #[error("missing field `{0}` in provider response")]
    MissingField(String),

    #[error("field `{field}` in provider response is not {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result type alias for proxygrab operations
pub type Result<T> = std::result::Result<T, Error>;
