//! Error types for standx-client.

use thiserror::Error;

/// Exchange client errors.
///
/// `Api` and `Network` are deliberately distinct: an API rejection is a
/// definitive answer from the exchange, while a network failure says
/// nothing about whether the exchange saw the request. The trading loop
/// retries neither within a tick; the next tick re-evaluates naturally.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response or a JSON body with a non-zero embedded code.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Transport-level failure (connection reset, socket error, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be read or parsed.
    #[error("Response parse error: {0}")]
    Parse(String),

    /// Failed to construct the HTTP client or serialize a request body.
    #[error("Request build error: {0}")]
    Build(String),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
