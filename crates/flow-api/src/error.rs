use serde::Deserialize;
use thiserror::Error;

/// Errors returned by Flow API operations.
///
/// Every network-related variant names the operation that failed, so callers
/// never have to guess which request an error belongs to.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Client construction failed: bad base URL or missing environment.
    #[error("config error: {0}")]
    Config(String),

    /// A mutating request was rejected locally before any network I/O.
    #[error("{operation}: required fields are missing or zero")]
    Validation { operation: &'static str },

    /// The round trip itself failed: DNS, connect, timeout, malformed response.
    #[error("{operation}: transport failure: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Flow answered outside 2xx with a structured error body.
    #[error("{operation}: rejected by Flow: {message} (code {code})")]
    Remote {
        operation: &'static str,
        code: i64,
        message: String,
    },

    /// Flow answered outside 2xx and the body was not a structured error.
    #[error("{operation}: http error {status}")]
    Status { operation: &'static str, status: u16 },

    /// A 2xx body did not match the expected success schema.
    #[error("{operation}: failed to decode response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Error body Flow returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct RemoteError {
    pub message: String,
    pub code: i64,
}
